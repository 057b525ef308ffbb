// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup by [`AppConfig::from_env`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `PRIVATE_KEY` | Service key, hex | One of the two key variables is required |
//! | `PRIVATE_KEY_PEM_PATH` | Service key, PEM file (SEC1 or PKCS#8) | |
//! | `CCIP_ALLOWED_SENDERS` | Comma separated resolver contract addresses | Unset (any sender) |
//! | `IDENTITY_API_URL` | Remote user-lookup service | Unset (in-memory registry) |
//! | `IDENTITY_SEED_PATH` | JSON seed file for the in-memory registry | Unset |
//! | `ETH_SEPOLIA_RPC` | Ethereum Sepolia RPC URL | Public endpoint |
//! | `BASE_SEPOLIA_RPC` | Base Sepolia RPC URL | Public endpoint |
//! | `ARBITRUM_SEPOLIA_RPC` | Arbitrum Sepolia RPC URL | Public endpoint |
//! | `ETH_MESSAGE_TRANSMITTER_ADDRESS` | Vault leg destination contract | Relay disabled if unset |
//! | `BASE_MESSAGE_TRANSMITTER_ADDRESS` | Telepay leg destination contract | Relay disabled if unset |
//! | `ATTESTATION_API_URL` | Attestation service base URL | Circle Iris sandbox |
//! | `ATTESTATION_POLL_INTERVAL_SECS` | Seconds between attestation polls | `2` |
//! | `ATTESTATION_MAX_ATTEMPTS` | Attestation polls before giving up | `150` |
//! | `RELAY_CONFIRMATION_TIMEOUT_SECS` | Wait for a relayed transaction to be mined | `120` |
//! | `TELEPAY_CONTRACT_ADDRESS` | Telepay contract on Base Sepolia for relayed transfers | Transfers disabled if unset |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS with these PEM files | Unset (HTTP) |

use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use tracing_subscriber::EnvFilter;

use crate::blockchain::{
    signing::{signer_from_hex, signer_from_pem_file, KeyError},
    SUPPORTED_NETWORKS,
};
use crate::relay::attestation::{
    DEFAULT_ATTESTATION_API_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL,
};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";
pub const PRIVATE_KEY_PEM_PATH_ENV: &str = "PRIVATE_KEY_PEM_PATH";
pub const CCIP_ALLOWED_SENDERS_ENV: &str = "CCIP_ALLOWED_SENDERS";
pub const IDENTITY_API_URL_ENV: &str = "IDENTITY_API_URL";
pub const IDENTITY_SEED_PATH_ENV: &str = "IDENTITY_SEED_PATH";
pub const ETH_MESSAGE_TRANSMITTER_ENV: &str = "ETH_MESSAGE_TRANSMITTER_ADDRESS";
pub const BASE_MESSAGE_TRANSMITTER_ENV: &str = "BASE_MESSAGE_TRANSMITTER_ADDRESS";
pub const ATTESTATION_API_URL_ENV: &str = "ATTESTATION_API_URL";
pub const ATTESTATION_POLL_INTERVAL_ENV: &str = "ATTESTATION_POLL_INTERVAL_SECS";
pub const ATTESTATION_MAX_ATTEMPTS_ENV: &str = "ATTESTATION_MAX_ATTEMPTS";
pub const RELAY_CONFIRMATION_TIMEOUT_ENV: &str = "RELAY_CONFIRMATION_TIMEOUT_SECS";
pub const TELEPAY_CONTRACT_ENV: &str = "TELEPAY_CONTRACT_ADDRESS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(String),

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Where the service signing key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum KeySource {
    Hex(String),
    PemFile(PathBuf),
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Hex(_) => f.write_str("Hex(<redacted>)"),
            KeySource::PemFile(path) => f.debug_tuple("PemFile").field(path).finish(),
        }
    }
}

impl KeySource {
    pub fn load(&self) -> Result<PrivateKeySigner, KeyError> {
        match self {
            KeySource::Hex(hex) => signer_from_hex(hex),
            KeySource::PemFile(path) => signer_from_pem_file(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Deposit relay settings; present only when both destination transmitters are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub eth_message_transmitter: Address,
    pub base_message_transmitter: Address,
    pub attestation_api_url: String,
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub service_key: KeySource,
    pub allowed_senders: Option<HashSet<Address>>,
    pub identity_api_url: Option<String>,
    pub identity_seed_path: Option<PathBuf>,
    /// RPC URL per network key.
    pub rpc_urls: HashMap<&'static str, String>,
    pub relay: Option<RelayConfig>,
    /// Telepay contract receiving relayed transfers; `None` disables `/v1/transfer`.
    pub telepay_contract: Option<Address>,
    /// Upper bound on waiting for any submitted transaction to be mined.
    pub confirmation_timeout: Duration,
    pub tls: Option<TlsPaths>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let service_key = match (get(PRIVATE_KEY_ENV), get(PRIVATE_KEY_PEM_PATH_ENV)) {
            (Some(hex), _) => KeySource::Hex(hex),
            (None, Some(path)) => KeySource::PemFile(PathBuf::from(path)),
            (None, None) => {
                return Err(ConfigError::Missing(format!(
                    "{PRIVATE_KEY_ENV} or {PRIVATE_KEY_PEM_PATH_ENV}"
                )))
            }
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let allowed_senders = get(CCIP_ALLOWED_SENDERS_ENV)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| parse_address(CCIP_ALLOWED_SENDERS_ENV, s))
                    .collect::<Result<HashSet<_>, _>>()
            })
            .transpose()?;

        let rpc_urls = SUPPORTED_NETWORKS
            .iter()
            .map(|network| {
                let url = get(network.rpc_env).unwrap_or_else(|| network.default_rpc_url.to_string());
                (network.key, url)
            })
            .collect();

        let relay = match (get(ETH_MESSAGE_TRANSMITTER_ENV), get(BASE_MESSAGE_TRANSMITTER_ENV)) {
            (Some(eth), Some(base)) => Some(RelayConfig {
                eth_message_transmitter: parse_address(ETH_MESSAGE_TRANSMITTER_ENV, &eth)?,
                base_message_transmitter: parse_address(BASE_MESSAGE_TRANSMITTER_ENV, &base)?,
                attestation_api_url: get(ATTESTATION_API_URL_ENV)
                    .unwrap_or_else(|| DEFAULT_ATTESTATION_API_URL.to_string()),
                poll_interval: get(ATTESTATION_POLL_INTERVAL_ENV)
                    .map(|v| parse_number::<u64>(ATTESTATION_POLL_INTERVAL_ENV, &v))
                    .transpose()?
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_POLL_INTERVAL),
                max_attempts: get(ATTESTATION_MAX_ATTEMPTS_ENV)
                    .map(|v| parse_number::<u32>(ATTESTATION_MAX_ATTEMPTS_ENV, &v))
                    .transpose()?
                    .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(BASE_MESSAGE_TRANSMITTER_ENV.into())),
            (None, Some(_)) => return Err(ConfigError::Missing(ETH_MESSAGE_TRANSMITTER_ENV.into())),
        };

        let telepay_contract = get(TELEPAY_CONTRACT_ENV)
            .map(|raw| parse_address(TELEPAY_CONTRACT_ENV, &raw))
            .transpose()?;

        let confirmation_timeout = get(RELAY_CONFIRMATION_TIMEOUT_ENV)
            .map(|v| parse_number::<u64>(RELAY_CONFIRMATION_TIMEOUT_ENV, &v))
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT);

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV.into())),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV.into())),
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: get(PORT_ENV)
                .map(|v| parse_number::<u16>(PORT_ENV, &v))
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
            log_format,
            service_key,
            allowed_senders,
            identity_api_url: get(IDENTITY_API_URL_ENV),
            identity_seed_path: get(IDENTITY_SEED_PATH_ENV).map(PathBuf::from),
            rpc_urls,
            relay,
            telepay_contract,
            confirmation_timeout,
            tls,
        })
    }

    pub fn rpc_url(&self, network_key: &str) -> Option<&str> {
        self.rpc_urls.get(network_key).map(String::as_str)
    }
}

fn parse_address(var: &'static str, raw: &str) -> Result<Address, ConfigError> {
    Address::from_str(raw).map_err(|e| ConfigError::Invalid {
        var,
        reason: format!("`{raw}`: {e}"),
    })
}

fn parse_number<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: format!("`{raw}`: {e}"),
    })
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` controls the filter; `LOG_FORMAT=json` switches to one JSON
/// object per event for log shippers.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match format {
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {e}");
    }
}
