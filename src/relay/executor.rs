// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Delivery of attested messages to their destination chains.

use std::{sync::Arc, time::Duration};

use alloy::primitives::{Bytes, B256};
use async_trait::async_trait;
use tracing::info;

use super::extractor::BridgeMessage;
use crate::blockchain::{ChainError, NetworkConfig, BASE_SEPOLIA, ETHEREUM_SEPOLIA};

/// Gas limit pinned on the Base Sepolia leg.
pub const TELEPAY_LEG_GAS_LIMIT: u64 = 500_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Received on the destination in this transaction.
    Relayed { tx_hash: B256 },
    /// The destination had already received this message.
    AlreadyProcessed,
}

/// Destination for messages at one ordinal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayLeg {
    pub label: &'static str,
    pub destination: NetworkConfig,
    pub gas_limit: Option<u64>,
}

/// Vault deposit on Ethereum Sepolia first, then the Telepay credit on Base Sepolia.
pub fn default_legs() -> Vec<RelayLeg> {
    vec![
        RelayLeg {
            label: "vault",
            destination: ETHEREUM_SEPOLIA,
            gas_limit: None,
        },
        RelayLeg {
            label: "telepay",
            destination: BASE_SEPOLIA,
            gas_limit: Some(TELEPAY_LEG_GAS_LIMIT),
        },
    ]
}

/// Something that can call `receiveMessage` on a destination transmitter.
#[async_trait]
pub trait MessageReceiver: Send + Sync {
    async fn receive_message(
        &self,
        destination: &NetworkConfig,
        message: &Bytes,
        attestation: &Bytes,
        gas_limit: Option<u64>,
    ) -> Result<RelayOutcome, ChainError>;

    /// Whether `destination` can currently accept submissions.
    async fn check_destination(&self, destination: &NetworkConfig) -> Result<(), ChainError>;
}

pub struct RelayExecutor {
    receiver: Arc<dyn MessageReceiver>,
    legs: Vec<RelayLeg>,
}

impl RelayExecutor {
    pub fn new(receiver: Arc<dyn MessageReceiver>, legs: Vec<RelayLeg>) -> Self {
        Self { receiver, legs }
    }

    pub fn legs(&self) -> &[RelayLeg] {
        &self.legs
    }

    /// Leg for a message ordinal; ordinals past the end use the last leg.
    pub fn leg_for(&self, ordinal: usize) -> Option<&RelayLeg> {
        self.legs.get(ordinal.min(self.legs.len().saturating_sub(1)))
    }

    /// Check every leg destination in leg order, giving each at most `timeout`.
    pub async fn check_destinations(
        &self,
        timeout: Duration,
    ) -> Vec<(RelayLeg, Result<(), ChainError>)> {
        let mut results = Vec::with_capacity(self.legs.len());
        for leg in &self.legs {
            let check = self.receiver.check_destination(&leg.destination);
            let result = tokio::time::timeout(timeout, check)
                .await
                .unwrap_or_else(|_| {
                    Err(ChainError::Rpc {
                        message: format!("{} did not respond in time", leg.destination.name),
                        code: None,
                    })
                });
            results.push((*leg, result));
        }
        results
    }

    /// Submit one attested message to its leg's destination.
    pub async fn relay(
        &self,
        leg: &RelayLeg,
        message: &BridgeMessage,
        attestation: &Bytes,
    ) -> Result<RelayOutcome, ChainError> {
        let outcome = self
            .receiver
            .receive_message(&leg.destination, &message.raw_bytes, attestation, leg.gas_limit)
            .await?;

        match outcome {
            RelayOutcome::Relayed { tx_hash } => info!(
                leg = leg.label,
                destination = leg.destination.key,
                ordinal = message.ordinal,
                %tx_hash,
                "Message relayed"
            ),
            RelayOutcome::AlreadyProcessed => info!(
                leg = leg.label,
                destination = leg.destination.key,
                ordinal = message.ordinal,
                "Message already processed on destination"
            ),
        }
        Ok(outcome)
    }
}
