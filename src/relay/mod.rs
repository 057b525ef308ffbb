// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cross-chain deposit relay.
//!
//! A deposit transaction on a source chain burns funds through the CCTP
//! message transmitter and emits one `MessageSent` event per destination.
//! The relay picks those messages out of the receipt, waits for each to be
//! attested and submits them to their destination chains in emission order.
//!
//! [`transfer`] relays user-signed Telepay transfers paid for by the service
//! wallet.

pub mod attestation;
pub mod engine;
pub mod executor;
pub mod extractor;
pub mod transfer;

pub use attestation::{AttestationPoller, AttestationProvider, IrisAttestationClient};
pub use engine::{DepositRelayEngine, DepositReport, DepositRequest, DepositStatus, RelayError};
pub use executor::{MessageReceiver, RelayExecutor, RelayLeg, RelayOutcome};
pub use extractor::ReceiptSource;
pub use transfer::{TransferError, TransferRelay, TransferSubmitter};
