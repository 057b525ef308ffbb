// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{
    ccip::ResolutionEngine,
    identity::IdentityStore,
    relay::{DepositRelayEngine, TransferRelay},
};

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ResolutionEngine>,
    /// Relay engine; `None` when no destination transmitters are configured.
    pub relay: Option<Arc<DepositRelayEngine>>,
    /// Transfer relay; `None` when no Telepay contract is configured.
    pub transfer: Option<Arc<TransferRelay>>,
}

impl AppState {
    pub fn new(resolver: ResolutionEngine) -> Self {
        Self {
            resolver: Arc::new(resolver),
            relay: None,
            transfer: None,
        }
    }

    pub fn with_relay(mut self, relay: DepositRelayEngine) -> Self {
        self.relay = Some(Arc::new(relay));
        self
    }

    pub fn with_transfer(mut self, transfer: TransferRelay) -> Self {
        self.transfer = Some(Arc::new(transfer));
        self
    }

    pub fn identities(&self) -> &Arc<dyn IdentityStore> {
        self.resolver.identities()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ccip::signer::tests::test_signer;
    use crate::identity::{IdentityRecord, InMemoryIdentityStore};
    use alloy::primitives::address;

    /// State with `alice` registered and relaying disabled.
    pub(crate) fn test_state() -> AppState {
        let store = InMemoryIdentityStore::from_records([IdentityRecord {
            username: "alice".into(),
            public_key: address!("1111111111111111111111111111111111111111"),
        }]);
        AppState::new(ResolutionEngine::new(
            Arc::new(store),
            Arc::new(test_signer(1_700_000_000)),
        ))
    }

    #[tokio::test]
    async fn identities_are_shared_with_resolver() {
        let state = test_state();
        assert_eq!(state.identities().backend(), "memory");
        assert!(state.relay.is_none());
        assert!(state.transfer.is_none());
    }
}
