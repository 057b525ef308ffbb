// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bridge message extraction from source-chain receipts.

use alloy::{
    primitives::{keccak256, Bytes, B256},
    sol_types::SolEvent,
};
use async_trait::async_trait;

use crate::blockchain::{transmitter::IMessageTransmitter::MessageSent, ChainError, NetworkConfig};

/// A log entry from a transaction receipt, reduced to what the relay reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLog {
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Where source-chain receipts come from.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    /// Logs of `tx_hash` on `network`; `None` when no receipt exists.
    async fn receipt_logs(
        &self,
        network: &NetworkConfig,
        tx_hash: B256,
    ) -> Result<Option<Vec<ReceiptLog>>, ChainError>;
}

/// One cross-chain message emitted by the deposit transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeMessage {
    /// Position among the transaction's `MessageSent` logs.
    pub ordinal: usize,
    pub raw_bytes: Bytes,
    /// `keccak256(raw_bytes)`, the key the attestation service uses.
    pub message_hash: B256,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("MessageSent log #{ordinal} has undecodable data: {reason}")]
pub struct MalformedEvent {
    pub ordinal: usize,
    pub reason: String,
}

/// Every `MessageSent` message in `logs`, in log order.
pub fn extract_messages(logs: &[ReceiptLog]) -> Result<Vec<BridgeMessage>, MalformedEvent> {
    logs.iter()
        .filter(|log| log.topics.first() == Some(&MessageSent::SIGNATURE_HASH))
        .enumerate()
        .map(|(ordinal, log)| {
            let event = MessageSent::abi_decode_data(&log.data).map_err(|e| MalformedEvent {
                ordinal,
                reason: e.to_string(),
            })?;
            let raw_bytes = event.0;
            Ok(BridgeMessage {
                ordinal,
                message_hash: keccak256(&raw_bytes),
                raw_bytes,
            })
        })
        .collect()
}
