// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CCIP-Read (EIP-3668) gateway logic.
//!
//! - `dns` - DNS wire-format names
//! - `decoder` - `resolve(bytes,bytes)` calldata
//! - `response` - replies for `addr` selectors
//! - `signer` - response attestation
//! - `engine` - request pipeline

pub mod decoder;
pub mod dns;
pub mod engine;
pub mod response;
pub mod signer;

pub use engine::{ResolutionEngine, ResolveError, ResolveRequest};
pub use signer::{AttestationSigner, Clock, SignedResolution, SystemClock};
