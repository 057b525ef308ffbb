// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use alloy::signers::local::PrivateKeySigner;
use axum_server::tls_rustls::RustlsConfig;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use telepay_gateway::{
    api::router,
    blockchain::{
        signing::{wallet_from_signer, KeyError},
        ChainClient, ChainError, ChainRegistry, BASE_SEPOLIA, ETHEREUM_SEPOLIA, SUPPORTED_NETWORKS,
    },
    ccip::{AttestationSigner, ResolutionEngine},
    config::{init_tracing, AppConfig, ConfigError, RelayConfig},
    identity::{HttpIdentityStore, IdentityStore, IdentityStoreError, InMemoryIdentityStore},
    relay::{
        attestation::AttestationError, executor::default_legs, AttestationPoller,
        DepositRelayEngine, IrisAttestationClient, RelayExecutor, TransferRelay,
    },
    state::AppState,
};

/// Grace period for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Identity(#[from] IdentityStoreError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Attestation(#[from] AttestationError),
    #[error("invalid bind address: {0}")]
    BindAddress(#[from] std::net::AddrParseError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider was already installed");
    }

    let shutdown = CancellationToken::new();
    let state = build_state(&config, shutdown.clone())?;
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
            shutdown.cancel();
        }
    });

    match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            let handle = axum_server::Handle::new();
            tokio::spawn({
                let handle = handle.clone();
                let shutdown = shutdown.clone();
                async move {
                    shutdown.cancelled().await;
                    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
                }
            });

            info!(%addr, "Telepay gateway listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, "Telepay gateway listening on http (docs at /docs)");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await?;
        }
    }

    info!("Telepay gateway stopped");
    Ok(())
}

fn build_state(config: &AppConfig, shutdown: CancellationToken) -> Result<AppState, StartupError> {
    let signer = config.service_key.load()?;
    info!(address = %signer.address(), "Loaded service key");

    let identities: Arc<dyn IdentityStore> =
        match (&config.identity_api_url, &config.identity_seed_path) {
            (Some(url), _) => Arc::new(HttpIdentityStore::new(url.clone())?),
            (None, Some(path)) => Arc::new(InMemoryIdentityStore::from_seed_file(path)?),
            (None, None) => Arc::new(InMemoryIdentityStore::new()),
        };
    info!(backend = identities.backend(), "Identity store ready");

    let mut resolver =
        ResolutionEngine::new(identities, Arc::new(AttestationSigner::new(signer.clone())));
    match &config.allowed_senders {
        Some(senders) => {
            info!(count = senders.len(), "CCIP sender allow-list enabled");
            resolver = resolver.with_allowed_senders(senders.clone());
        }
        None => info!("CCIP sender allow-list disabled, any resolver contract is accepted"),
    }

    let mut state = AppState::new(resolver);
    if config.relay.is_none() && config.telepay_contract.is_none() {
        warn!("No relay contracts configured, deposit and transfer relays disabled");
        return Ok(state);
    }

    let chains = Arc::new(build_chains(config, signer)?);
    match &config.relay {
        Some(relay) => state = state.with_relay(build_relay(relay, chains.clone(), shutdown)?),
        None => warn!("Message transmitter addresses not set, deposit relay disabled"),
    }
    match config.telepay_contract {
        Some(contract) => {
            info!(%contract, "Transfer relay enabled");
            state = state.with_transfer(TransferRelay::new(chains));
        }
        None => warn!("Telepay contract address not set, transfer relay disabled"),
    }
    Ok(state)
}

/// One client per supported network, all signing with the service wallet.
fn build_chains(config: &AppConfig, signer: PrivateKeySigner) -> Result<ChainRegistry, StartupError> {
    let wallet = wallet_from_signer(signer);

    let mut chains = ChainRegistry::new();
    for network in SUPPORTED_NETWORKS {
        let rpc_url = config.rpc_url(network.key).unwrap_or(network.default_rpc_url);
        let mut client =
            ChainClient::new(network, rpc_url, wallet.clone(), config.confirmation_timeout)?;
        if let Some(relay) = &config.relay {
            if network == ETHEREUM_SEPOLIA {
                client = client.with_message_transmitter(relay.eth_message_transmitter);
            } else if network == BASE_SEPOLIA {
                client = client.with_message_transmitter(relay.base_message_transmitter);
            }
        }
        if network == BASE_SEPOLIA {
            if let Some(contract) = config.telepay_contract {
                client = client.with_telepay_contract(contract);
            }
        }
        chains.insert(client);
    }
    Ok(chains)
}

fn build_relay(
    relay: &RelayConfig,
    chains: Arc<ChainRegistry>,
    shutdown: CancellationToken,
) -> Result<DepositRelayEngine, StartupError> {
    let attestations = IrisAttestationClient::new(relay.attestation_api_url.clone())?;
    let poller = AttestationPoller::new(Arc::new(attestations), shutdown)
        .with_limits(relay.poll_interval, relay.max_attempts);

    info!(
        attestation_api = %relay.attestation_api_url,
        max_attempts = relay.max_attempts,
        "Deposit relay enabled"
    );

    Ok(DepositRelayEngine::new(
        chains.clone(),
        poller,
        RelayExecutor::new(chains, default_legs()),
    ))
}
