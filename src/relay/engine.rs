// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deposit relay: receipt → messages → attestations → destination chains.

use std::{str::FromStr, sync::Arc};

use alloy::primitives::B256;
use tracing::{info, instrument, warn};

use super::{
    attestation::{AttestationError, AttestationPoller},
    executor::{RelayExecutor, RelayOutcome},
    extractor::{extract_messages, BridgeMessage, MalformedEvent, ReceiptSource},
};
use crate::blockchain::{network_by_key, ChainError, NetworkConfig};

/// Marker reported in place of a transaction hash for an already received leg.
pub const ALREADY_PROCESSED: &str = "already_processed";

#[derive(Debug, Clone)]
pub struct DepositRequest {
    pub tx_hash: B256,
    pub source_chain: NetworkConfig,
    /// Fail with `NoMessagesFound` instead of reporting zero messages.
    pub require_messages: bool,
}

impl DepositRequest {
    /// Validate raw request fields.
    pub fn parse(tx_hash: &str, chain: &str, require_messages: bool) -> Result<Self, RelayError> {
        let tx_hash = tx_hash.trim();
        if tx_hash.is_empty() {
            return Err(RelayError::MissingParameter("depositTxHash"));
        }
        if chain.trim().is_empty() {
            return Err(RelayError::MissingParameter("chain"));
        }

        let source_chain =
            network_by_key(chain).ok_or_else(|| RelayError::UnsupportedChain(chain.to_string()))?;
        let tx_hash = B256::from_str(tx_hash)
            .map_err(|e| RelayError::InvalidParameter(format!("depositTxHash: {e}")))?;

        Ok(Self {
            tx_hash,
            source_chain,
            require_messages,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("transaction receipt not found for {0}")]
    ReceiptNotFound(B256),

    #[error(transparent)]
    MalformedEvent(#[from] MalformedEvent),

    #[error("no MessageSent events in {0}")]
    NoMessagesFound(B256),

    #[error("attestation for {message_hash} not ready after {attempts} attempts")]
    AttestationTimeout { message_hash: B256, attempts: u32 },

    #[error("attestation lookup failed: {0}")]
    AttestationFailed(String),

    #[error("relay cancelled by shutdown")]
    Cancelled,

    #[error("no relay leg configured for message #{0}")]
    NoRelayLeg(usize),

    #[error("{leg} relay to {destination} failed: {source}")]
    RelaySubmissionFailed {
        leg: &'static str,
        destination: &'static str,
        source: ChainError,
    },

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl RelayError {
    /// Stable machine-readable error code.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MissingParameter(_) => "MISSING_PARAMETER",
            RelayError::InvalidParameter(_) => "INVALID_PARAMETER",
            RelayError::UnsupportedChain(_) => "UNSUPPORTED_CHAIN",
            RelayError::ReceiptNotFound(_) => "RECEIPT_NOT_FOUND",
            RelayError::MalformedEvent(_) => "MALFORMED_EVENT",
            RelayError::NoMessagesFound(_) => "NO_MESSAGES_FOUND",
            RelayError::AttestationTimeout { .. } => "ATTESTATION_TIMEOUT",
            RelayError::AttestationFailed(_) => "ATTESTATION_FAILED",
            RelayError::Cancelled => "CANCELLED",
            RelayError::NoRelayLeg(_) => "NO_RELAY_LEG",
            RelayError::RelaySubmissionFailed { .. } => "RELAY_SUBMISSION_FAILED",
            RelayError::Chain(e) => e.kind(),
        }
    }

    /// JSON-RPC error code from the node, when it returned one.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            RelayError::Chain(ChainError::Rpc { code, .. })
            | RelayError::RelaySubmissionFailed {
                source: ChainError::Rpc { code, .. },
                ..
            } => *code,
            _ => None,
        }
    }
}

impl From<AttestationError> for RelayError {
    fn from(err: AttestationError) -> Self {
        match err {
            AttestationError::Timeout {
                message_hash,
                attempts,
            } => RelayError::AttestationTimeout {
                message_hash,
                attempts,
            },
            AttestationError::Cancelled => RelayError::Cancelled,
            other => RelayError::AttestationFailed(other.to_string()),
        }
    }
}

/// What happened to one bridge message.
#[derive(Debug)]
pub struct LegReport {
    pub ordinal: usize,
    pub label: Option<&'static str>,
    pub destination_chain: Option<&'static str>,
    pub message_hash: B256,
    pub result: Result<RelayOutcome, RelayError>,
}

impl LegReport {
    /// Transaction hash, or `already_processed`; `None` for a failed leg.
    pub fn tx_display(&self) -> Option<String> {
        match &self.result {
            Ok(RelayOutcome::Relayed { tx_hash }) => Some(format!("{tx_hash:#x}")),
            Ok(RelayOutcome::AlreadyProcessed) => Some(ALREADY_PROCESSED.to_string()),
            Err(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositStatus {
    Processed,
    AlreadyProcessed,
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Processed => "processed",
            DepositStatus::AlreadyProcessed => ALREADY_PROCESSED,
        }
    }
}

#[derive(Debug)]
pub struct DepositReport {
    pub tx_hash: B256,
    pub legs: Vec<LegReport>,
}

impl DepositReport {
    pub fn summary(&self) -> String {
        format!("Processed {} message(s)", self.legs.len())
    }

    /// `already_processed` if any leg was already received, else `processed`.
    pub fn status(&self) -> DepositStatus {
        let replayed = self
            .legs
            .iter()
            .any(|leg| matches!(leg.result, Ok(RelayOutcome::AlreadyProcessed)));
        if replayed {
            DepositStatus::AlreadyProcessed
        } else {
            DepositStatus::Processed
        }
    }

    /// Result of the last message relayed on the leg named `label`.
    pub fn leg_tx(&self, label: &str) -> Option<String> {
        self.legs
            .iter()
            .rev()
            .find(|leg| leg.label == Some(label))
            .and_then(LegReport::tx_display)
    }

    pub fn first_failure(&self) -> Option<&RelayError> {
        self.legs.iter().find_map(|leg| leg.result.as_ref().err())
    }
}

pub struct DepositRelayEngine {
    receipts: Arc<dyn ReceiptSource>,
    poller: AttestationPoller,
    executor: RelayExecutor,
}

impl DepositRelayEngine {
    pub fn new(
        receipts: Arc<dyn ReceiptSource>,
        poller: AttestationPoller,
        executor: RelayExecutor,
    ) -> Self {
        Self {
            receipts,
            poller,
            executor,
        }
    }

    pub fn executor(&self) -> &RelayExecutor {
        &self.executor
    }

    /// Relay every bridge message of a deposit transaction, in ordinal order.
    ///
    /// Request-level problems (no receipt, malformed events) are errors. A
    /// failing message is recorded on its leg and the remaining messages are
    /// still relayed.
    #[instrument(skip_all, fields(tx_hash = %request.tx_hash, chain = request.source_chain.key))]
    pub async fn process_deposit(
        &self,
        request: &DepositRequest,
    ) -> Result<DepositReport, RelayError> {
        let logs = self
            .receipts
            .receipt_logs(&request.source_chain, request.tx_hash)
            .await?
            .ok_or(RelayError::ReceiptNotFound(request.tx_hash))?;

        let messages = extract_messages(&logs)?;
        info!(count = messages.len(), "Found message(s) to process");

        if messages.is_empty() && request.require_messages {
            return Err(RelayError::NoMessagesFound(request.tx_hash));
        }

        let mut legs = Vec::with_capacity(messages.len());
        for message in &messages {
            legs.push(self.process_message(message).await);
        }

        Ok(DepositReport {
            tx_hash: request.tx_hash,
            legs,
        })
    }

    async fn process_message(&self, message: &BridgeMessage) -> LegReport {
        let Some(leg) = self.executor.leg_for(message.ordinal).copied() else {
            return LegReport {
                ordinal: message.ordinal,
                label: None,
                destination_chain: None,
                message_hash: message.message_hash,
                result: Err(RelayError::NoRelayLeg(message.ordinal)),
            };
        };

        let result = match self.poller.wait_for(message.message_hash).await {
            Ok(attestation) => self
                .executor
                .relay(&leg, message, &attestation)
                .await
                .map_err(|source| RelayError::RelaySubmissionFailed {
                    leg: leg.label,
                    destination: leg.destination.key,
                    source,
                }),
            Err(e) => Err(e.into()),
        };

        if let Err(e) = &result {
            warn!(
                ordinal = message.ordinal,
                leg = leg.label,
                message_hash = %message.message_hash,
                error = %e,
                "Failed to relay message"
            );
        }

        LegReport {
            ordinal: message.ordinal,
            label: Some(leg.label),
            destination_chain: Some(leg.destination.key),
            message_hash: message.message_hash,
            result,
        }
    }
}
