// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relayed Telepay transfers.
//!
//! The user signs a transfer off-chain; the service wallet pays gas and
//! submits it to the Telepay contract on Base Sepolia.

use std::{str::FromStr, sync::Arc};

use alloy::{
    hex,
    primitives::{Bytes, B256, U256},
};
use async_trait::async_trait;
use tracing::{info, instrument};

use crate::blockchain::{telepay::TransferCall, ChainError, NetworkConfig, BASE_SEPOLIA};

/// Something that can submit `transfer(...)` to a Telepay contract.
#[async_trait]
pub trait TransferSubmitter: Send + Sync {
    async fn submit_transfer(
        &self,
        network: &NetworkConfig,
        transfer: &TransferCall,
    ) -> Result<B256, ChainError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl TransferError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::MissingParameter(_) => "MISSING_PARAMETER",
            TransferError::InvalidParameter { .. } => "INVALID_PARAMETER",
            TransferError::Chain(e) => e.kind(),
        }
    }
}

/// Parse a transfer from its wire fields. A zero amount counts as missing.
pub fn parse_transfer(
    amount: &str,
    source_pub_key: &str,
    target_pub_key: &str,
    signature: &str,
) -> Result<TransferCall, TransferError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(TransferError::MissingParameter("amount"));
    }
    let amount = U256::from_str(amount).map_err(|e| TransferError::InvalidParameter {
        name: "amount",
        reason: e.to_string(),
    })?;
    if amount.is_zero() {
        return Err(TransferError::MissingParameter("amount"));
    }

    Ok(TransferCall {
        amount,
        source_pub_key: hex_field("sourcePubKey", source_pub_key)?,
        target_pub_key: hex_field("targetPubKey", target_pub_key)?,
        signature: hex_field("signature", signature)?,
    })
}

fn hex_field(name: &'static str, raw: &str) -> Result<Bytes, TransferError> {
    let raw = raw.trim();
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.is_empty() {
        return Err(TransferError::MissingParameter(name));
    }
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| TransferError::InvalidParameter {
            name,
            reason: e.to_string(),
        })
}

pub struct TransferRelay {
    submitter: Arc<dyn TransferSubmitter>,
    network: NetworkConfig,
}

impl TransferRelay {
    /// Relay to the Telepay deployment on Base Sepolia.
    pub fn new(submitter: Arc<dyn TransferSubmitter>) -> Self {
        Self {
            submitter,
            network: BASE_SEPOLIA,
        }
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    #[instrument(skip_all, fields(network = self.network.key, amount = %transfer.amount))]
    pub async fn transfer(&self, transfer: &TransferCall) -> Result<B256, TransferError> {
        let tx_hash = self.submitter.submit_transfer(&self.network, transfer).await?;
        info!(%tx_hash, "Transfer relayed");
        Ok(tx_hash)
    }
}
