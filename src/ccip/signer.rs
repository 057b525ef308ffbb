// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CCIP-Read response signing.
//!
//! The resolver contract verifies gateway replies with
//! `SignatureVerifier.makeSignatureHash`, which hashes:
//!
//! ```text
//! 0x19 0x00 ‖ sender (20) ‖ uint64 expires (8, big-endian) ‖ keccak(request) ‖ keccak(result)
//! ```
//!
//! The digest is then signed as an EIP-191 personal message, so the on-chain
//! `ecrecover` runs over `keccak("\x19Ethereum Signed Message:\n32" ‖ digest)`.

use std::sync::Arc;

use alloy::{
    primitives::{keccak256, Address, Bytes, B256},
    signers::{local::PrivateKeySigner, SignerSync},
};

/// Validity window of a signed response, in seconds.
pub const RESPONSE_TTL_SECS: u64 = 3600;

/// EIP-191 version byte prefix used by the resolver's signature check.
const SIGNATURE_DOMAIN: [u8; 2] = [0x19, 0x00];

/// Source of the current unix time.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// A gateway reply together with its attestation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedResolution {
    pub response_data: Bytes,
    pub expires_at: u64,
    pub signature: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("sender must be a 20-byte address, got {0} bytes")]
    InvalidSender(usize),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Long-lived signer shared by every resolution request.
pub struct AttestationSigner {
    key: PrivateKeySigner,
    clock: Arc<dyn Clock>,
    ttl_secs: u64,
}

impl AttestationSigner {
    pub fn new(key: PrivateKeySigner) -> Self {
        Self::with_clock(key, Arc::new(SystemClock))
    }

    pub fn with_clock(key: PrivateKeySigner, clock: Arc<dyn Clock>) -> Self {
        Self {
            key,
            clock,
            ttl_secs: RESPONSE_TTL_SECS,
        }
    }

    /// Address the resolver contract must trust.
    pub fn address(&self) -> Address {
        self.key.address()
    }

    /// Sign `response_data` as the reply to `call_data` sent by `sender`.
    pub fn sign(
        &self,
        sender: &[u8],
        call_data: &[u8],
        response_data: Bytes,
    ) -> Result<SignedResolution, SignError> {
        if sender.len() != 20 {
            return Err(SignError::InvalidSender(sender.len()));
        }
        let sender = Address::from_slice(sender);

        let expires_at = self.clock.now_unix() + self.ttl_secs;
        let digest = signature_digest(
            sender,
            expires_at,
            keccak256(call_data),
            keccak256(&response_data),
        );

        let signature = self
            .key
            .sign_message_sync(digest.as_slice())
            .map_err(|e| SignError::Signing(e.to_string()))?;

        Ok(SignedResolution {
            response_data,
            expires_at,
            signature: Bytes::copy_from_slice(&signature.as_bytes()),
        })
    }
}

/// Hash the CCIP-Read signing payload.
pub fn signature_digest(
    sender: Address,
    expires_at: u64,
    request_hash: B256,
    result_hash: B256,
) -> B256 {
    let mut payload = Vec::with_capacity(2 + 20 + 8 + 32 + 32);
    payload.extend_from_slice(&SIGNATURE_DOMAIN);
    payload.extend_from_slice(sender.as_slice());
    payload.extend_from_slice(&expires_at.to_be_bytes());
    payload.extend_from_slice(request_hash.as_slice());
    payload.extend_from_slice(result_hash.as_slice());
    keccak256(&payload)
}
