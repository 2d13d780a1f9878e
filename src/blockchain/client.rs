// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sepolia client for confidential balance reads.

use alloy::{
    network::Ethereum,
    primitives::{Address, B256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};
use async_trait::async_trait;

use super::contracts::{IConfidentialStaking, IConfidentialToken};
use super::types::*;

/// HTTP provider type for Sepolia (with all fillers).
pub(crate) type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Read side of the staking contracts.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// `confidentialBalanceOf(account)` on the token contract.
    async fn confidential_balance_of(
        &self,
        token: Address,
        account: Address,
    ) -> Result<EncryptedHandle, ChainClientError>;

    /// `confidentialStakedBalance(asset, account)` on the staking contract.
    async fn confidential_staked_balance(
        &self,
        staking: Address,
        asset: Address,
        account: Address,
    ) -> Result<EncryptedHandle, ChainClientError>;
}

/// Sepolia read client.
pub struct SepoliaClient {
    /// Network configuration
    network: NetworkConfig,
    /// Alloy HTTP provider
    provider: HttpProvider,
}

impl SepoliaClient {
    /// Create a new client against the given RPC endpoint.
    pub fn new(network: NetworkConfig, rpc_url: &str) -> Result<Self, ChainClientError> {
        let url = parse_rpc_url(rpc_url)?;
        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self { network, provider })
    }

    /// Create a client using the network's default public RPC endpoint.
    pub fn sepolia() -> Result<Self, ChainClientError> {
        Self::new(SEPOLIA, SEPOLIA.rpc_url)
    }

    /// Get the current block number.
    pub async fn get_block_number(&self) -> Result<u64, ChainClientError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

#[async_trait]
impl BalanceReader for SepoliaClient {
    async fn confidential_balance_of(
        &self,
        token: Address,
        account: Address,
    ) -> Result<EncryptedHandle, ChainClientError> {
        let contract = IConfidentialToken::new(token, self.provider.clone());
        let handle: B256 = contract
            .confidentialBalanceOf(account)
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;
        Ok(EncryptedHandle(handle))
    }

    async fn confidential_staked_balance(
        &self,
        staking: Address,
        asset: Address,
        account: Address,
    ) -> Result<EncryptedHandle, ChainClientError> {
        let contract = IConfidentialStaking::new(staking, self.provider.clone());
        let handle: B256 = contract
            .confidentialStakedBalance(asset, account)
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;
        Ok(EncryptedHandle(handle))
    }
}

pub(crate) fn parse_rpc_url(rpc_url: &str) -> Result<url::Url, ChainClientError> {
    rpc_url
        .parse()
        .map_err(|e: url::ParseError| ChainClientError::InvalidRpcUrl(e.to_string()))
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Transaction {0} reverted")]
    Reverted(B256),
}
