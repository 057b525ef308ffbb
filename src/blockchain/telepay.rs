// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Telepay contract bindings.

use alloy::{
    primitives::{Bytes, U256},
    sol,
};

sol! {
    #[sol(rpc)]
    interface ITelepay {
        function transfer(
            uint256 amount,
            bytes sourcePubKey,
            bytes targetPubKey,
            bytes signature
        ) external returns (bool);
    }
}

/// A user-signed Telepay transfer, submitted by the service wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCall {
    pub amount: U256,
    pub source_pub_key: Bytes,
    pub target_pub_key: Bytes,
    pub signature: Bytes,
}
