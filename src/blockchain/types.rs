// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Network presets.

/// EVM network configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Stable key used in requests and configuration (e.g. `base-sepolia`)
    pub key: &'static str,
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Environment variable overriding the RPC endpoint
    pub rpc_env: &'static str,
    /// Public RPC endpoint used when the override is unset
    pub default_rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Ethereum Sepolia testnet.
pub const ETHEREUM_SEPOLIA: NetworkConfig = NetworkConfig {
    key: "ethereum-sepolia",
    name: "Ethereum Sepolia",
    chain_id: 11_155_111,
    rpc_env: "ETH_SEPOLIA_RPC",
    default_rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    explorer_url: "https://sepolia.etherscan.io",
};

/// Base Sepolia testnet.
pub const BASE_SEPOLIA: NetworkConfig = NetworkConfig {
    key: "base-sepolia",
    name: "Base Sepolia",
    chain_id: 84_532,
    rpc_env: "BASE_SEPOLIA_RPC",
    default_rpc_url: "https://sepolia.base.org",
    explorer_url: "https://sepolia.basescan.org",
};

/// Arbitrum Sepolia testnet.
pub const ARBITRUM_SEPOLIA: NetworkConfig = NetworkConfig {
    key: "arbitrum-sepolia",
    name: "Arbitrum Sepolia",
    chain_id: 421_614,
    rpc_env: "ARBITRUM_SEPOLIA_RPC",
    default_rpc_url: "https://sepolia-rollup.arbitrum.io/rpc",
    explorer_url: "https://sepolia.arbiscan.io",
};

/// Every network the gateway can talk to.
pub const SUPPORTED_NETWORKS: [NetworkConfig; 3] = [ETHEREUM_SEPOLIA, BASE_SEPOLIA, ARBITRUM_SEPOLIA];

/// Find a supported network by its key, case-insensitively.
pub fn network_by_key(raw: &str) -> Option<NetworkConfig> {
    let key = raw.trim().to_ascii_lowercase();
    SUPPORTED_NETWORKS.into_iter().find(|n| n.key == key)
}
