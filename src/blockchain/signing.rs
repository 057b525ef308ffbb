// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Service key loading.
//!
//! The gateway uses one secp256k1 key both to attest CCIP-Read responses and
//! to pay for relay transactions. It is loaded once at startup, either as a
//! hex string or from a PEM file (SEC1 or PKCS#8).

use std::path::Path;

use alloy::{network::EthereumWallet, signers::local::PrivateKeySigner};
use k256::SecretKey;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Failed to read key file {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Create a signer from a hex private key, with or without `0x`.
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, KeyError> {
    let trimmed = private_key_hex.trim();
    let key_bytes = alloy::hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes).map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))
}

/// Parse a private key from PEM format to hex string.
///
/// # Returns
/// * `Ok(String)` - Hex-encoded private key (64 characters, no 0x prefix)
/// * `Err(KeyError)` - If PEM parsing fails
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, KeyError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| KeyError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| KeyError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| KeyError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from PEM-encoded private key bytes.
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, KeyError> {
    let hex_key = pem_to_hex(pem_bytes)?;
    signer_from_hex(&hex_key)
}

/// Read a PEM key file and create a signer from it.
pub fn signer_from_pem_file(path: &Path) -> Result<PrivateKeySigner, KeyError> {
    let bytes = std::fs::read(path).map_err(|e| KeyError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    signer_from_pem(&bytes)
}

/// Create an Ethereum wallet for transaction submission.
pub fn wallet_from_signer(signer: PrivateKeySigner) -> EthereumWallet {
    EthereumWallet::from(signer)
}
