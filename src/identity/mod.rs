// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Lookup
//!
//! Maps a Telepay username to the address its name resolves to. The
//! resolution engine only reads through [`IdentityStore`]; registration is
//! exposed for the registry endpoints and may be unsupported by a backend.
//!
//! ## Backends
//!
//! - [`InMemoryIdentityStore`] - process-local map, optionally seeded from JSON
//! - [`HttpIdentityStore`] - delegates to an external user-lookup service

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod http;
pub mod memory;

pub use http::HttpIdentityStore;
pub use memory::InMemoryIdentityStore;

/// A username and the address it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    pub username: String,
    pub public_key: Address,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityStoreError {
    #[error("identity `{0}` is already registered")]
    AlreadyExists(String),

    #[error("identity backend does not accept registrations")]
    ReadOnly,

    #[error("identity backend unavailable: {0}")]
    Backend(String),
}

/// Normalize a username for storage and lookup.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up a username. `username` is already normalized.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError>;

    /// Register a new identity, rejecting usernames already taken.
    async fn register(&self, _record: IdentityRecord) -> Result<(), IdentityStoreError> {
        Err(IdentityStoreError::ReadOnly)
    }

    /// Short backend name for health output.
    fn backend(&self) -> &'static str;
}
