// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for the supported EVM testnets.
//!
//! This module provides functionality for:
//! - Network presets and per-network clients
//! - Service key loading
//! - CCTP message transmitter bindings
//! - Telepay contract bindings

pub mod client;
pub mod signing;
pub mod telepay;
pub mod transmitter;
pub mod types;

pub use client::{ChainClient, ChainError, ChainRegistry};
pub use types::*;
