// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM chain clients used by the deposit relay.

use std::{collections::HashMap, time::Duration};

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, B256},
    providers::{
        DynProvider, PendingTransactionBuilder, PendingTransactionError, Provider, ProviderBuilder,
        WatchTxError,
    },
    rpc::types::TransactionReceipt,
    transports::TransportError,
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::telepay::{ITelepay, TransferCall};
use super::transmitter::{classify_revert, IMessageTransmitter, MessageHeader, RevertKind};
use super::types::NetworkConfig;
use crate::relay::{
    executor::{MessageReceiver, RelayOutcome},
    extractor::{ReceiptLog, ReceiptSource},
    transfer::TransferSubmitter,
};

/// Client for one EVM network, signing with the service wallet.
pub struct ChainClient {
    /// Network configuration
    network: NetworkConfig,
    /// Alloy HTTP provider with wallet and fillers
    provider: DynProvider,
    /// CCTP message transmitter on this network, if relaying here is enabled
    message_transmitter: Option<Address>,
    /// Telepay contract, if relayed transfers target this network
    telepay_contract: Option<Address>,
    /// Upper bound on waiting for a submitted transaction to be mined
    confirmation_timeout: Duration,
}

impl ChainClient {
    /// Create a new client for the specified network.
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        wallet: EthereumWallet,
        confirmation_timeout: Duration,
    ) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();

        Ok(Self {
            network,
            provider,
            message_transmitter: None,
            telepay_contract: None,
            confirmation_timeout,
        })
    }

    /// Enable message delivery on this network.
    pub fn with_message_transmitter(mut self, address: Address) -> Self {
        self.message_transmitter = Some(address);
        self
    }

    /// Enable relayed Telepay transfers on this network.
    pub fn with_telepay_contract(mut self, address: Address) -> Self {
        self.telepay_contract = Some(address);
        self
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn message_transmitter(&self) -> Option<Address> {
        self.message_transmitter
    }

    pub fn telepay_contract(&self) -> Option<Address> {
        self.telepay_contract
    }

    /// Get the current block number.
    pub async fn get_block_number(&self) -> Result<u64, ChainError> {
        self.provider.get_block_number().await.map_err(rpc_error)
    }

    /// Logs of a mined transaction, or `None` if the node has no receipt for it.
    pub async fn receipt_logs(&self, tx_hash: B256) -> Result<Option<Vec<ReceiptLog>>, ChainError> {
        let Some(receipt) = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(rpc_error)?
        else {
            return Ok(None);
        };

        let logs = receipt
            .inner
            .logs()
            .iter()
            .map(|log| ReceiptLog {
                topics: log.inner.data.topics().to_vec(),
                data: log.inner.data.data.clone(),
            })
            .collect();
        Ok(Some(logs))
    }

    /// Whether the transmitter has already consumed this message's nonce.
    async fn nonce_used(&self, transmitter: Address, header: &MessageHeader) -> Result<bool, ChainError> {
        let contract = IMessageTransmitter::new(transmitter, self.provider.clone());
        let used = contract
            .usedNonces(header.nonce_key())
            .call()
            .await
            .map_err(contract_error)?;
        Ok(!used.is_zero())
    }

    /// Submit `receiveMessage(message, attestation)` and wait for it to be mined.
    pub async fn receive_message(
        &self,
        message: &Bytes,
        attestation: &Bytes,
        gas_limit: Option<u64>,
    ) -> Result<RelayOutcome, ChainError> {
        let transmitter = self
            .message_transmitter
            .ok_or_else(|| ChainError::TransmitterNotConfigured(self.network.key.to_string()))?;

        let header = MessageHeader::parse(message);
        if let Some(header) = &header {
            match self.nonce_used(transmitter, header).await {
                Ok(true) => {
                    info!(
                        network = self.network.key,
                        source_domain = header.source_domain,
                        nonce = header.nonce,
                        "Message nonce already used, skipping submission"
                    );
                    return Ok(RelayOutcome::AlreadyProcessed);
                }
                Ok(false) => {}
                Err(e) => warn!(network = self.network.key, error = %e, "usedNonces pre-check failed"),
            }
        }

        let contract = IMessageTransmitter::new(transmitter, self.provider.clone());
        let mut call = contract.receiveMessage(message.clone(), attestation.clone());
        if let Some(limit) = gas_limit {
            call = call.gas(limit);
        }

        let pending = match call.send().await {
            Ok(pending) => pending,
            Err(e) => {
                if let Some(data) = e.as_revert_data() {
                    match classify_revert(&data) {
                        RevertKind::NonceAlreadyUsed => return Ok(RelayOutcome::AlreadyProcessed),
                        kind => debug!(network = self.network.key, ?kind, "receiveMessage reverted"),
                    }
                }
                return Err(contract_error(e));
            }
        };

        let tx_hash = *pending.tx_hash();
        info!(
            network = self.network.key,
            tx = %format!("{}/tx/{:#x}", self.network.explorer_url, tx_hash),
            "Submitted receiveMessage"
        );

        let receipt = self.wait_mined(pending).await?;
        if !receipt.status() {
            // A competing delivery may have consumed the nonce between our
            // pre-check and inclusion.
            let nonce_check = match &header {
                Some(header) => Some(self.nonce_used(transmitter, header).await),
                None => None,
            };
            return reverted_outcome(&self.network, tx_hash, nonce_check);
        }

        Ok(RelayOutcome::Relayed {
            tx_hash: receipt.transaction_hash,
        })
    }

    /// Submit a user-signed `transfer(...)` to the Telepay contract and wait
    /// for it to be mined.
    pub async fn transfer(&self, transfer: &TransferCall) -> Result<B256, ChainError> {
        let telepay = self
            .telepay_contract
            .ok_or_else(|| ChainError::TelepayNotConfigured(self.network.key.to_string()))?;

        let contract = ITelepay::new(telepay, self.provider.clone());
        let pending = contract
            .transfer(
                transfer.amount,
                transfer.source_pub_key.clone(),
                transfer.target_pub_key.clone(),
                transfer.signature.clone(),
            )
            .send()
            .await
            .map_err(|e| match e.as_revert_data().map(|data| classify_revert(&data)) {
                Some(RevertKind::Reason(reason)) => {
                    ChainError::ContractError(format!("transfer reverted: {reason}"))
                }
                _ => contract_error(e),
            })?;

        let tx_hash = *pending.tx_hash();
        info!(
            network = self.network.key,
            amount = %transfer.amount,
            tx = %format!("{}/tx/{:#x}", self.network.explorer_url, tx_hash),
            "Submitted Telepay transfer"
        );

        let receipt = self.wait_mined(pending).await?;
        if !receipt.status() {
            return Err(ChainError::TransactionFailed(format!(
                "{tx_hash:#x} reverted on {}",
                self.network.name
            )));
        }
        Ok(receipt.transaction_hash)
    }

    /// Wait for a submitted transaction, bounded by the confirmation timeout.
    async fn wait_mined(
        &self,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TransactionReceipt, ChainError> {
        let tx_hash = *pending.tx_hash();
        pending
            .with_timeout(Some(self.confirmation_timeout))
            .get_receipt()
            .await
            .map_err(|e| match e {
                PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
                    ChainError::ConfirmationTimeout(tx_hash)
                }
                PendingTransactionError::TransportError(e) => rpc_error(e),
                other => ChainError::TransactionFailed(other.to_string()),
            })
    }
}

/// Classify a mined `receiveMessage` that reverted, given a fresh read of the
/// message's nonce.
fn reverted_outcome(
    network: &NetworkConfig,
    tx_hash: B256,
    nonce_check: Option<Result<bool, ChainError>>,
) -> Result<RelayOutcome, ChainError> {
    match nonce_check {
        Some(Ok(true)) => {
            info!(
                network = network.key,
                tx = %format!("{tx_hash:#x}"),
                "receiveMessage reverted after the nonce was consumed elsewhere"
            );
            return Ok(RelayOutcome::AlreadyProcessed);
        }
        Some(Err(e)) => warn!(network = network.key, error = %e, "usedNonces re-check failed"),
        Some(Ok(false)) | None => {}
    }
    Err(ChainError::TransactionFailed(format!(
        "{tx_hash:#x} reverted on {}",
        network.name
    )))
}

/// Chain clients keyed by network key.
#[derive(Default)]
pub struct ChainRegistry {
    clients: HashMap<&'static str, ChainClient>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, client: ChainClient) {
        self.clients.insert(client.network.key, client);
    }

    pub fn get(&self, network: &NetworkConfig) -> Result<&ChainClient, ChainError> {
        self.clients
            .get(network.key)
            .ok_or_else(|| ChainError::UnsupportedChain(network.key.to_string()))
    }

    pub fn networks(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.clients.values().map(ChainClient::network)
    }
}

#[async_trait]
impl ReceiptSource for ChainRegistry {
    async fn receipt_logs(
        &self,
        network: &NetworkConfig,
        tx_hash: B256,
    ) -> Result<Option<Vec<ReceiptLog>>, ChainError> {
        self.get(network)?.receipt_logs(tx_hash).await
    }
}

#[async_trait]
impl MessageReceiver for ChainRegistry {
    async fn receive_message(
        &self,
        destination: &NetworkConfig,
        message: &Bytes,
        attestation: &Bytes,
        gas_limit: Option<u64>,
    ) -> Result<RelayOutcome, ChainError> {
        self.get(destination)?
            .receive_message(message, attestation, gas_limit)
            .await
    }

    async fn check_destination(&self, destination: &NetworkConfig) -> Result<(), ChainError> {
        let client = self.get(destination)?;
        if client.message_transmitter.is_none() {
            return Err(ChainError::TransmitterNotConfigured(destination.key.to_string()));
        }
        client.get_block_number().await.map(|_| ())
    }
}

#[async_trait]
impl TransferSubmitter for ChainRegistry {
    async fn submit_transfer(
        &self,
        network: &NetworkConfig,
        transfer: &TransferCall,
    ) -> Result<B256, ChainError> {
        self.get(network)?.transfer(transfer).await
    }
}

fn rpc_error(err: TransportError) -> ChainError {
    ChainError::Rpc {
        code: err.as_error_resp().map(|payload| payload.code),
        message: err.to_string(),
    }
}

fn contract_error(err: alloy::contract::Error) -> ChainError {
    match err {
        alloy::contract::Error::TransportError(e) => rpc_error(e),
        other => ChainError::ContractError(other.to_string()),
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("No message transmitter configured on {0}")]
    TransmitterNotConfigured(String),

    #[error("No Telepay contract configured on {0}")]
    TelepayNotConfigured(String),

    #[error("RPC error: {message}")]
    Rpc { message: String, code: Option<i64> },

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Timed out waiting for {0:#x} to be mined")]
    ConfirmationTimeout(B256),
}

impl ChainError {
    pub fn kind(&self) -> &'static str {
        match self {
            ChainError::UnsupportedChain(_) => "UNSUPPORTED_CHAIN",
            ChainError::InvalidRpcUrl(_) => "INVALID_RPC_URL",
            ChainError::TransmitterNotConfigured(_) => "TRANSMITTER_NOT_CONFIGURED",
            ChainError::TelepayNotConfigured(_) => "TELEPAY_NOT_CONFIGURED",
            ChainError::Rpc { .. } => "RPC_ERROR",
            ChainError::ContractError(_) => "CONTRACT_ERROR",
            ChainError::TransactionFailed(_) => "TRANSACTION_FAILED",
            ChainError::ConfirmationTimeout(_) => "CONFIRMATION_TIMEOUT",
        }
    }
}
