// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize` and/or `Deserialize` and
//! `ToSchema` for automatic JSON handling and OpenAPI documentation.
//!
//! Binary values (calldata, signatures, hashes, addresses) travel as
//! `0x`-prefixed hex strings.
//!
//! ## Model Categories
//!
//! - **CCIP-Read**: gateway lookups from the on-chain resolver
//! - **Deposits**: cross-chain deposit relay requests and reports
//! - **Transfers**: relayed Telepay transfers
//! - **Identities**: the username registry

use alloy::{hex, primitives::B256};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    ccip::SignedResolution,
    identity::IdentityRecord,
    relay::{
        engine::{DepositReport, LegReport},
        RelayOutcome,
    },
};

// =============================================================================
// CCIP-Read Models
// =============================================================================

/// A CCIP-Read lookup as posted by the client library.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CcipRequest {
    /// DNS wire-format name, hex.
    pub name: String,
    /// `resolve(bytes,bytes)` calldata, hex.
    pub data: String,
    /// Resolver contract address, hex.
    pub sender: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CcipResponseData {
    /// ABI-encoded resolver result, hex.
    pub response: String,
    /// Unix timestamp after which the signature is no longer valid.
    pub expires: u64,
    /// 65-byte signature, hex.
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CcipResponse {
    pub data: CcipResponseData,
}

impl From<SignedResolution> for CcipResponse {
    fn from(signed: SignedResolution) -> Self {
        Self {
            data: CcipResponseData {
                response: hex::encode_prefixed(&signed.response_data),
                expires: signed.expires_at,
                signature: hex::encode_prefixed(&signed.signature),
            },
        }
    }
}

// =============================================================================
// Deposit Models
// =============================================================================

/// Request to relay the bridge messages of a deposit transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DepositRelayRequest {
    /// Deposit transaction hash on the source chain.
    pub deposit_tx_hash: String,
    /// Source chain key, e.g. `base-sepolia`.
    pub chain: String,
    /// Fail when the transaction emitted no bridge messages.
    pub require_messages: bool,
}

/// Result for one bridge message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LegOutcome {
    /// Position of the message among the transaction's bridge messages.
    pub ordinal: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_chain: Option<String>,
    pub message_hash: String,
    /// `relayed`, `already_processed` or `failed`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// JSON-RPC error code returned by the node, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_code: Option<i64>,
}

impl From<&LegReport> for LegOutcome {
    fn from(report: &LegReport) -> Self {
        let mut outcome = Self {
            ordinal: report.ordinal,
            leg: report.label.map(str::to_string),
            destination_chain: report.destination_chain.map(str::to_string),
            message_hash: format!("{:#x}", report.message_hash),
            status: String::new(),
            tx_hash: None,
            error: None,
            error_type: None,
            rpc_code: None,
        };
        match &report.result {
            Ok(RelayOutcome::Relayed { tx_hash }) => {
                outcome.status = "relayed".into();
                outcome.tx_hash = Some(format!("{tx_hash:#x}"));
            }
            Ok(RelayOutcome::AlreadyProcessed) => {
                outcome.status = "already_processed".into();
            }
            Err(e) => {
                outcome.status = "failed".into();
                outcome.error = Some(e.to_string());
                outcome.error_type = Some(e.kind().to_string());
                outcome.rpc_code = e.rpc_code();
            }
        }
        outcome
    }
}

/// Deposit relay summary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DepositRelayResponse {
    pub success: bool,
    /// `Processed N message(s)`.
    pub message: String,
    /// Vault leg transaction hash, or `already_processed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_tx: Option<String>,
    /// Telepay leg transaction hash, or `already_processed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telepay_tx: Option<String>,
    /// `processed` or `already_processed`.
    pub status: String,
    pub outcomes: Vec<LegOutcome>,
}

impl From<&DepositReport> for DepositRelayResponse {
    fn from(report: &DepositReport) -> Self {
        Self {
            success: report.first_failure().is_none(),
            message: report.summary(),
            vault_tx: report.leg_tx("vault"),
            telepay_tx: report.leg_tx("telepay"),
            status: report.status().as_str().to_string(),
            outcomes: report.legs.iter().map(LegOutcome::from).collect(),
        }
    }
}

// =============================================================================
// Transfer Models
// =============================================================================

/// Transfer amount in token base units, as a JSON number or a decimal/hex string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TransferAmount {
    Number(u64),
    Text(String),
}

impl Default for TransferAmount {
    fn default() -> Self {
        TransferAmount::Text(String::new())
    }
}

impl TransferAmount {
    pub fn as_text(&self) -> String {
        match self {
            TransferAmount::Number(n) => n.to_string(),
            TransferAmount::Text(s) => s.clone(),
        }
    }
}

/// A user-signed transfer for the service wallet to submit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TransferRelayRequest {
    pub amount: TransferAmount,
    /// Sender public key, hex.
    pub source_pub_key: String,
    /// Recipient public key, hex.
    pub target_pub_key: String,
    /// Sender's signature over the transfer, hex.
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferRelayResponse {
    pub success: bool,
    /// Hash of the mined transfer transaction.
    pub tx_hash: String,
}

impl From<B256> for TransferRelayResponse {
    fn from(tx_hash: B256) -> Self {
        Self {
            success: true,
            tx_hash: format!("{tx_hash:#x}"),
        }
    }
}

// =============================================================================
// Identity Models
// =============================================================================

/// A registered username and its address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub username: String,
    /// Address the username resolves to, hex.
    pub public_key: String,
}

impl From<IdentityRecord> for Identity {
    fn from(record: IdentityRecord) -> Self {
        Self {
            username: record.username,
            public_key: record.public_key.to_checksum(None),
        }
    }
}

/// Request to register a username.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterIdentityRequest {
    pub username: String,
    /// Address the username should resolve to, hex.
    pub public_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Bytes, B256};

    #[test]
    fn transfer_amount_accepts_number_or_string() {
        let request: TransferRelayRequest =
            serde_json::from_value(serde_json::json!({ "amount": 1500, "signature": "0x1b" }))
                .unwrap();
        assert_eq!(request.amount.as_text(), "1500");
        assert_eq!(request.source_pub_key, "");

        let request: TransferRelayRequest =
            serde_json::from_value(serde_json::json!({ "amount": "0x10" })).unwrap();
        assert_eq!(request.amount, TransferAmount::Text("0x10".into()));

        let response = TransferRelayResponse::from(B256::repeat_byte(0xab));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["txHash"].as_str().unwrap().starts_with("0xabab"));
    }

    #[test]
    fn ccip_response_is_hex_encoded() {
        let response = CcipResponse::from(SignedResolution {
            response_data: Bytes::from_static(&[0xab, 0xcd]),
            expires_at: 1_700_003_600,
            signature: Bytes::from_static(&[0x01]),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": { "response": "0xabcd", "expires": 1_700_003_600u64, "signature": "0x01" }
            })
        );
    }

    #[test]
    fn deposit_request_uses_camel_case_and_defaults() {
        let request: DepositRelayRequest =
            serde_json::from_str(r#"{"depositTxHash":"0x01","chain":"base-sepolia"}"#).unwrap();
        assert_eq!(request.deposit_tx_hash, "0x01");
        assert!(!request.require_messages);

        let empty: DepositRelayRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.chain.is_empty());
    }

    #[test]
    fn already_processed_leg_has_no_tx_hash() {
        let report = LegReport {
            ordinal: 0,
            label: Some("vault"),
            destination_chain: Some("ethereum-sepolia"),
            message_hash: B256::ZERO,
            result: Ok(RelayOutcome::AlreadyProcessed),
        };
        let outcome = LegOutcome::from(&report);
        assert_eq!(outcome.status, "already_processed");
        assert_eq!(outcome.tx_hash, None);

        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("type").is_none());
    }

    #[test]
    fn identity_uses_checksum_address() {
        let identity = Identity::from(IdentityRecord {
            username: "alice".into(),
            public_key: address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
        });
        assert_eq!(
            identity.public_key,
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["publicKey"], identity.public_key);
    }
}
