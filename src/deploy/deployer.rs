// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract creation over JSON-RPC.

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::{local::PrivateKeySigner, Signer},
};
use async_trait::async_trait;

use super::{ContractArtifact, ContractDeployer, DeployError, DeployedContract};
use crate::blockchain::client::parse_rpc_url;
use crate::blockchain::wallet::SigningProvider;
use crate::blockchain::{ChainClientError, NetworkConfig};

pub struct AlloyDeployer {
    address: Address,
    network: NetworkConfig,
    provider: SigningProvider,
}

impl AlloyDeployer {
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        signer: PrivateKeySigner,
    ) -> Result<Self, DeployError> {
        let url = parse_rpc_url(rpc_url)?;
        let signer = signer.with_chain_id(Some(network.chain_id));
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url);

        Ok(Self {
            address,
            network,
            provider,
        })
    }

    /// Fail early when the RPC endpoint serves a different chain.
    pub async fn ensure_chain(&self) -> Result<(), DeployError> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get chain id: {}", e)))?;
        if chain_id != self.network.chain_id {
            return Err(ChainClientError::RpcError(format!(
                "RPC serves chain {chain_id}, expected {} ({})",
                self.network.chain_id, self.network.name
            ))
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl ContractDeployer for AlloyDeployer {
    fn deployer(&self) -> Address {
        self.address
    }

    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_args: Bytes,
    ) -> Result<DeployedContract, DeployError> {
        let mut code = artifact.bytecode.to_vec();
        code.extend_from_slice(&constructor_args);

        let tx = TransactionRequest::default()
            .from(self.address)
            .with_deploy_code(code);

        let pending = self.provider.send_transaction(tx).await.map_err(|e| {
            ChainClientError::TransactionFailed(format!(
                "Failed to deploy {}: {}",
                artifact.contract_name, e
            ))
        })?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(
            contract = %artifact.contract_name,
            tx_hash = %tx_hash,
            explorer = %format!("{}/tx/{}", self.network.explorer_url, tx_hash),
            "Deployment submitted, waiting for receipt"
        );

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get receipt: {}", e)))?;

        if !receipt.status() {
            return Err(ChainClientError::Reverted(receipt.transaction_hash).into());
        }

        let address = receipt
            .contract_address
            .ok_or_else(|| DeployError::NoContractAddress(artifact.contract_name.clone()))?;

        Ok(DeployedContract {
            address,
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }
}
