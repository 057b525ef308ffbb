// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory identity store.

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{normalize_username, IdentityRecord, IdentityStore, IdentityStoreError};

#[derive(Default)]
pub struct InMemoryIdentityStore {
    records: RwLock<HashMap<String, IdentityRecord>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, normalizing usernames. Later duplicates win.
    pub fn from_records(records: impl IntoIterator<Item = IdentityRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|mut record| {
                record.username = normalize_username(&record.username);
                (record.username.clone(), record)
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Load a JSON array of `{ "username", "publicKey" }` objects.
    pub fn from_seed_file(path: &Path) -> Result<Self, IdentityStoreError> {
        let raw = std::fs::read(path).map_err(|e| {
            IdentityStoreError::Backend(format!("failed to read {}: {e}", path.display()))
        })?;
        let records: Vec<IdentityRecord> = serde_json::from_slice(&raw).map_err(|e| {
            IdentityStoreError::Backend(format!("invalid seed file {}: {e}", path.display()))
        })?;
        Ok(Self::from_records(records))
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError> {
        Ok(self.records.read().await.get(username).cloned())
    }

    async fn register(&self, mut record: IdentityRecord) -> Result<(), IdentityStoreError> {
        record.username = normalize_username(&record.username);

        let mut records = self.records.write().await;
        if records.contains_key(&record.username) {
            return Err(IdentityStoreError::AlreadyExists(record.username));
        }
        records.insert(record.username.clone(), record);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use std::io::Write;

    fn alice() -> IdentityRecord {
        IdentityRecord {
            username: "Alice".into(),
            public_key: address!("1111111111111111111111111111111111111111"),
        }
    }

    #[tokio::test]
    async fn register_then_find() {
        let store = InMemoryIdentityStore::new();
        store.register(alice()).await.unwrap();

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.public_key, alice().public_key);
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let store = InMemoryIdentityStore::new();
        store.register(alice()).await.unwrap();

        let err = store.register(alice()).await.unwrap_err();
        assert!(matches!(err, IdentityStoreError::AlreadyExists(name) if name == "alice"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn loads_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"username":"Alice","publicKey":"0x1111111111111111111111111111111111111111"}},
                {{"username":"bob","publicKey":"0x2222222222222222222222222222222222222222"}}]"#
        )
        .unwrap();

        let store = InMemoryIdentityStore::from_seed_file(file.path()).unwrap();
        assert_eq!(store.len().await, 2);
        assert!(store.find_by_username("alice").await.unwrap().is_some());
    }

    #[test]
    fn invalid_seed_file_is_a_backend_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            InMemoryIdentityStore::from_seed_file(file.path()),
            Err(IdentityStoreError::Backend(_))
        ));
    }
}
