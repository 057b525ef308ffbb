// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Telepay Gateway - CCIP-Read Resolver Gateway & Cross-Chain Deposit Relay
//!
//! This crate answers off-chain lookups for the Telepay ENS resolver with
//! signed responses, and relays CCTP bridge messages from deposit
//! transactions to their destination chains.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `ccip` - CCIP-Read decoding, response encoding and signing
//! - `identity` - Username to address registry
//! - `relay` - Deposit relay engine
//! - `blockchain` - EVM chain clients and message transmitter bindings

pub mod api;
pub mod blockchain;
pub mod ccip;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod relay;
pub mod state;
