// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Attestation Polling
//!
//! A bridge message can only be received on the destination chain once the
//! attestation service has signed it. The service is keyed by the message
//! hash and answers `GET {base}/attestations/{hash}` with
//! `{ "status": "complete" | "pending_confirmations", "attestation": "0x.." }`.
//! Until it has seen the source transaction it answers 404, which is treated
//! as pending.
//!
//! `AttestationPoller` repeats the lookup every `poll_interval` and gives up
//! after `max_attempts`. It observes the process `CancellationToken`, so a
//! shutdown interrupts the wait instead of holding the request open.

use std::{sync::Arc, time::Duration};

use alloy::primitives::{Bytes, B256};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default attestation service (Circle Iris sandbox).
pub const DEFAULT_ATTESTATION_API_URL: &str = "https://iris-api-sandbox.circle.com";

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of polls before giving up (about five minutes).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttestationStatus {
    Pending,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    pub message_hash: B256,
    pub status: AttestationStatus,
    /// Signature bytes; present once `status` is `Complete`.
    pub payload: Option<Bytes>,
}

impl Attestation {
    pub fn pending(message_hash: B256) -> Self {
        Self {
            message_hash,
            status: AttestationStatus::Pending,
            payload: None,
        }
    }

    pub fn complete(message_hash: B256, payload: Bytes) -> Self {
        Self {
            message_hash,
            status: AttestationStatus::Complete,
            payload: Some(payload),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AttestationError {
    #[error("attestation request failed: {0}")]
    Request(String),

    #[error("invalid attestation response: {0}")]
    InvalidResponse(String),

    #[error("attestation for {message_hash} not complete after {attempts} attempts")]
    Timeout { message_hash: B256, attempts: u32 },

    #[error("attestation wait cancelled by shutdown")]
    Cancelled,
}

/// Source of attestations for bridge messages.
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Current attestation state for `message_hash`.
    async fn fetch(&self, message_hash: B256) -> Result<Attestation, AttestationError>;
}

#[derive(Debug, Deserialize)]
struct IrisAttestationResponse {
    status: String,
    attestation: Option<String>,
}

/// HTTP client for the Circle Iris attestation API.
#[derive(Debug, Clone)]
pub struct IrisAttestationClient {
    base_url: String,
    http: Client,
}

impl IrisAttestationClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AttestationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AttestationError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl AttestationProvider for IrisAttestationClient {
    async fn fetch(&self, message_hash: B256) -> Result<Attestation, AttestationError> {
        let url = format!("{}/attestations/{:#x}", self.base_url, message_hash);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AttestationError::Request(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Attestation::pending(message_hash));
        }
        if !status.is_success() {
            return Err(AttestationError::Request(format!("GET {url} returned {status}")));
        }

        let body: IrisAttestationResponse = response
            .json()
            .await
            .map_err(|e| AttestationError::InvalidResponse(e.to_string()))?;

        if body.status != "complete" {
            return Ok(Attestation::pending(message_hash));
        }

        let raw = body.attestation.ok_or_else(|| {
            AttestationError::InvalidResponse("complete attestation without payload".into())
        })?;
        let payload = alloy::hex::decode(&raw)
            .map_err(|e| AttestationError::InvalidResponse(format!("attestation is not hex: {e}")))?;

        Ok(Attestation::complete(message_hash, payload.into()))
    }
}

/// Bounded, cancellable wait for a complete attestation.
pub struct AttestationPoller {
    provider: Arc<dyn AttestationProvider>,
    poll_interval: Duration,
    max_attempts: u32,
    shutdown: CancellationToken,
}

impl AttestationPoller {
    pub fn new(provider: Arc<dyn AttestationProvider>, shutdown: CancellationToken) -> Self {
        Self {
            provider,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            shutdown,
        }
    }

    pub fn with_limits(mut self, poll_interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = poll_interval;
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Poll until the attestation for `message_hash` is complete.
    pub async fn wait_for(&self, message_hash: B256) -> Result<Bytes, AttestationError> {
        for attempt in 1..=self.max_attempts {
            if self.shutdown.is_cancelled() {
                return Err(AttestationError::Cancelled);
            }

            match self.provider.fetch(message_hash).await {
                Ok(Attestation {
                    status: AttestationStatus::Complete,
                    payload: Some(payload),
                    ..
                }) => {
                    info!(%message_hash, attempt, "Attestation complete");
                    return Ok(payload);
                }
                Ok(_) => debug!(%message_hash, attempt, "Attestation pending"),
                Err(e) => warn!(%message_hash, attempt, error = %e, "Attestation poll failed"),
            }

            if attempt < self.max_attempts {
                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => {},
                    _ = self.shutdown.cancelled() => return Err(AttestationError::Cancelled),
                }
            }
        }

        Err(AttestationError::Timeout {
            message_hash,
            attempts: self.max_attempts,
        })
    }
}
