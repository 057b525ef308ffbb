// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resolution engine: decode, look up, encode, sign.

use std::{collections::HashSet, sync::Arc};

use alloy::primitives::{Address, Bytes};
use tracing::{debug, info, instrument};

use super::{
    decoder::{decode_resolve_call, DecodeError},
    dns::{self, DnsNameError},
    response::encode_response,
    signer::{AttestationSigner, SignError, SignedResolution},
};
use crate::identity::{normalize_username, IdentityStore, IdentityStoreError};

/// An inbound CCIP-Read lookup.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// DNS wire-format name.
    pub dns_name: Bytes,
    /// `resolve(bytes,bytes)` calldata exactly as sent by the resolver.
    pub call_data: Bytes,
    /// Resolver contract that triggered the lookup.
    pub sender: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("sender {0} is not an allowed resolver")]
    SenderNotAllowed(Address),

    #[error("malformed name: {0}")]
    MalformedName(String),

    #[error("{0}")]
    UnrecognizedPrefix(String),

    #[error("{0}")]
    MalformedCall(String),

    #[error("{0}")]
    UnsupportedSelector(String),

    #[error("no public key found for username `{0}`")]
    IdentityNotFound(String),

    #[error("identity lookup failed: {0}")]
    IdentityLookup(#[from] IdentityStoreError),

    #[error("signing failed: {0}")]
    SigningFailure(String),
}

impl ResolveError {
    /// Stable machine-readable error code.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::MissingParameter(_) => "MISSING_PARAMETER",
            ResolveError::InvalidParameter(_) => "INVALID_PARAMETER",
            ResolveError::SenderNotAllowed(_) => "SENDER_NOT_ALLOWED",
            ResolveError::MalformedName(_) => "MALFORMED_NAME",
            ResolveError::UnrecognizedPrefix(_) => "UNRECOGNIZED_PREFIX",
            ResolveError::MalformedCall(_) => "MALFORMED_CALL",
            ResolveError::UnsupportedSelector(_) => "UNSUPPORTED_SELECTOR",
            ResolveError::IdentityNotFound(_) => "IDENTITY_NOT_FOUND",
            ResolveError::IdentityLookup(_) => "IDENTITY_LOOKUP_FAILED",
            ResolveError::SigningFailure(_) => "SIGNING_FAILURE",
        }
    }
}

impl From<DecodeError> for ResolveError {
    fn from(err: DecodeError) -> Self {
        match &err {
            DecodeError::UnrecognizedPrefix(_) => ResolveError::UnrecognizedPrefix(err.to_string()),
            DecodeError::MalformedCall(_) => ResolveError::MalformedCall(err.to_string()),
            DecodeError::MalformedName(inner) => ResolveError::MalformedName(inner.to_string()),
        }
    }
}

impl From<DnsNameError> for ResolveError {
    fn from(err: DnsNameError) -> Self {
        ResolveError::MalformedName(err.to_string())
    }
}

impl From<SignError> for ResolveError {
    fn from(err: SignError) -> Self {
        match &err {
            SignError::InvalidSender(_) => ResolveError::InvalidParameter(err.to_string()),
            SignError::Signing(msg) => ResolveError::SigningFailure(msg.clone()),
        }
    }
}

/// Stateless per request; shared across concurrent requests.
pub struct ResolutionEngine {
    identities: Arc<dyn IdentityStore>,
    signer: Arc<AttestationSigner>,
    allowed_senders: Option<HashSet<Address>>,
}

impl ResolutionEngine {
    pub fn new(identities: Arc<dyn IdentityStore>, signer: Arc<AttestationSigner>) -> Self {
        Self {
            identities,
            signer,
            allowed_senders: None,
        }
    }

    /// Only accept lookups triggered by these resolver contracts.
    pub fn with_allowed_senders(mut self, senders: HashSet<Address>) -> Self {
        self.allowed_senders = Some(senders);
        self
    }

    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    pub fn identities(&self) -> &Arc<dyn IdentityStore> {
        &self.identities
    }

    #[instrument(skip_all, fields(sender = %alloy::hex::encode_prefixed(&request.sender)))]
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<SignedResolution, ResolveError> {
        if request.dns_name.is_empty() {
            return Err(ResolveError::MissingParameter("name"));
        }
        if request.call_data.is_empty() {
            return Err(ResolveError::MissingParameter("data"));
        }
        if request.sender.is_empty() {
            return Err(ResolveError::MissingParameter("sender"));
        }

        if let Some(allowed) = &self.allowed_senders {
            if request.sender.len() == 20 {
                let sender = Address::from_slice(&request.sender);
                if !allowed.contains(&sender) {
                    return Err(ResolveError::SenderNotAllowed(sender));
                }
            }
        }

        let call = decode_resolve_call(&request.call_data)?;
        if dns::decode(&request.dns_name)? != call.name {
            return Err(ResolveError::MalformedName(
                "name does not match the name encoded in the resolver call".into(),
            ));
        }

        let username = call
            .name
            .split('.')
            .next()
            .map(normalize_username)
            .unwrap_or_default();
        if username.is_empty() {
            return Err(ResolveError::MalformedName("name has no labels".into()));
        }

        debug!(
            name = %call.name,
            username = %username,
            selector = %alloy::hex::encode(call.selector),
            "Decoded resolver call"
        );

        let identity = self
            .identities
            .find_by_username(&username)
            .await?
            .ok_or_else(|| ResolveError::IdentityNotFound(username.clone()))?;

        let response = encode_response(call.selector, identity.public_key)
            .map_err(|e| ResolveError::UnsupportedSelector(e.to_string()))?;

        let signed = self
            .signer
            .sign(&request.sender, &request.call_data, response)?;

        info!(
            name = %call.name,
            address = %identity.public_key,
            expires = signed.expires_at,
            "Signed resolution"
        );

        Ok(signed)
    }
}
