// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session wallet: the active account and its signing capability.
//!
//! Every write goes through [`Wallet::send`], which only returns once the
//! transaction has a receipt. A reverted receipt is reported as an error.

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, Signature},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    signers::{local::PrivateKeySigner, Signer},
    sol_types::SolCall,
};
use async_trait::async_trait;

use super::client::{parse_rpc_url, ChainClientError};
use super::contracts::{IConfidentialStaking, IConfidentialToken};
use super::types::{EncryptedHandle, NetworkConfig, TxOutcome};
use crate::relayer::Eip712Payload;

pub(crate) type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// A state-changing contract call issued by one of the workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    /// `claim(amount)` on a token contract.
    Claim { token: Address, amount: u64 },
    /// `confidentialTransferAndCall(to, handle, proof, data)` on a token contract.
    ConfidentialTransferAndCall {
        token: Address,
        to: Address,
        handle: EncryptedHandle,
        proof: Bytes,
        data: Bytes,
    },
    /// `withdraw(asset, handle, proof)` on the staking contract.
    Withdraw {
        staking: Address,
        asset: Address,
        handle: EncryptedHandle,
        proof: Bytes,
    },
}

impl ContractCall {
    /// Target contract and ABI-encoded calldata.
    pub fn encode(&self) -> (Address, Vec<u8>) {
        match self {
            ContractCall::Claim { token, amount } => (
                *token,
                IConfidentialToken::claimCall { amount: *amount }.abi_encode(),
            ),
            ContractCall::ConfidentialTransferAndCall {
                token,
                to,
                handle,
                proof,
                data,
            } => (
                *token,
                IConfidentialToken::confidentialTransferAndCallCall {
                    to: *to,
                    encryptedAmount: handle.0,
                    inputProof: proof.clone(),
                    data: data.clone(),
                }
                .abi_encode(),
            ),
            ContractCall::Withdraw {
                staking,
                asset,
                handle,
                proof,
            } => (
                *staking,
                IConfidentialStaking::withdrawCall {
                    asset: *asset,
                    encryptedAmount: handle.0,
                    inputProof: proof.clone(),
                }
                .abi_encode(),
            ),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContractCall::Claim { .. } => "claim",
            ContractCall::ConfidentialTransferAndCall { .. } => "confidentialTransferAndCall",
            ContractCall::Withdraw { .. } => "withdraw",
        }
    }
}

/// Connected wallet session.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Active account address.
    fn address(&self) -> Address;

    /// Sign an EIP-712 decryption authorization.
    async fn sign_typed_data(&self, payload: &Eip712Payload) -> Result<Signature, ChainClientError>;

    /// Submit a contract call and wait for its receipt.
    async fn send(&self, call: ContractCall) -> Result<TxOutcome, ChainClientError>;
}

/// Wallet backed by a local private key.
pub struct LocalWallet {
    signer: PrivateKeySigner,
    network: NetworkConfig,
    provider: SigningProvider,
}

impl LocalWallet {
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        signer: PrivateKeySigner,
    ) -> Result<Self, ChainClientError> {
        let url = parse_rpc_url(rpc_url)?;
        let signer = signer.with_chain_id(Some(network.chain_id));
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(url);

        Ok(Self {
            signer,
            network,
            provider,
        })
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

#[async_trait]
impl Wallet for LocalWallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_typed_data(&self, payload: &Eip712Payload) -> Result<Signature, ChainClientError> {
        self.signer
            .sign_typed_data(&payload.message, &payload.domain)
            .await
            .map_err(|e| ChainClientError::SigningFailed(e.to_string()))
    }

    async fn send(&self, call: ContractCall) -> Result<TxOutcome, ChainClientError> {
        let (to, data) = call.encode();
        let tx = TransactionRequest::default()
            .from(self.signer.address())
            .to(to)
            .input(data.into());

        let pending = self.provider.send_transaction(tx).await.map_err(|e| {
            ChainClientError::TransactionFailed(format!("Failed to send {}: {}", call.name(), e))
        })?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(
            call = call.name(),
            tx_hash = %tx_hash,
            explorer = %format!("{}/tx/{}", self.network.explorer_url, tx_hash),
            "Transaction submitted, waiting for receipt"
        );

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get receipt: {}", e)))?;

        if !receipt.status() {
            return Err(ChainClientError::Reverted(receipt.transaction_hash));
        }

        Ok(TxOutcome {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number.unwrap_or(0),
            gas_used: receipt.gas_used as u64,
        })
    }
}
