// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Contract Deployment
//!
//! Deploys the two confidential tokens and the staking contract that
//! accepts them:
//!
//! 1. `ConfidentialMETH`
//! 2. `ConfidentialMZama`
//! 3. `ConfidentialStaking(meth, mzama)`
//!
//! The run is recorded under the id [`DEPLOYMENT_ID`]; later runs print the
//! recorded addresses and deploy nothing unless `reset` is set. Within a
//! run, a contract whose recorded creation code and arguments are unchanged
//! is reused instead of redeployed.

use std::fmt;
use std::path::{Path, PathBuf};

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use chrono::Utc;

use crate::blockchain::ChainClientError;

pub mod artifacts;
pub mod deployer;
pub mod records;

pub use artifacts::ContractArtifact;
pub use deployer::AlloyDeployer;
pub use records::{DeploymentRecord, DeploymentStore};

/// Guard id of the confidential stake deployment.
pub const DEPLOYMENT_ID: &str = "deploy_confidential_stake";

pub const DEPLOYMENT_TAGS: [&str; 2] = ["ConfidentialTokens", "ConfidentialStaking"];

pub const METH_CONTRACT: &str = "ConfidentialMETH";
pub const MZAMA_CONTRACT: &str = "ConfidentialMZama";
pub const STAKING_CONTRACT: &str = "ConfidentialStaking";

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Deployment already ran but the {0} record is missing; rerun with --reset")]
    MissingRecord(String),

    #[error("Deployment of {0} returned no contract address")]
    NoContractAddress(String),

    #[error(transparent)]
    Chain(#[from] ChainClientError),
}

/// A contract creation that has been mined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    pub address: Address,
    pub tx_hash: B256,
    pub block_number: Option<u64>,
}

/// Submits contract creation transactions.
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// Account paying for and owning the deployments.
    fn deployer(&self) -> Address;

    /// Deploy `artifact` with ABI-encoded `constructor_args` appended to its
    /// creation code, and wait for the receipt.
    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_args: Bytes,
    ) -> Result<DeployedContract, DeployError>;
}

/// Address of one contract after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSummary {
    pub name: &'static str,
    pub address: Address,
    /// `false` when an existing deployment was reused.
    pub newly_deployed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSummary {
    /// The guard stopped the run; nothing was sent.
    pub skipped: bool,
    pub contracts: Vec<ContractSummary>,
}

impl DeploymentSummary {
    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.contracts
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.address)
    }
}

impl fmt::Display for DeploymentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for contract in &self.contracts {
            writeln!(f, "{} contract:  {}", contract.name, contract.address)?;
        }
        Ok(())
    }
}

/// The `deploy_confidential_stake` script.
pub struct ConfidentialStakeDeployment {
    store: DeploymentStore,
    artifacts_dir: PathBuf,
    reset: bool,
}

impl ConfidentialStakeDeployment {
    pub fn new(store: DeploymentStore, artifacts_dir: &Path, reset: bool) -> Self {
        Self {
            store,
            artifacts_dir: artifacts_dir.to_path_buf(),
            reset,
        }
    }

    pub async fn run(
        &self,
        deployer: &dyn ContractDeployer,
    ) -> Result<DeploymentSummary, DeployError> {
        if self.reset {
            tracing::info!(dir = %self.store.dir().display(), "Reset requested, clearing records");
            self.store.clear()?;
        } else if self.store.has_run(DEPLOYMENT_ID)? {
            tracing::info!(id = DEPLOYMENT_ID, "Deployment already executed, skipping");
            return self.recorded_summary();
        }

        tracing::info!(
            id = DEPLOYMENT_ID,
            deployer = %deployer.deployer(),
            tags = ?DEPLOYMENT_TAGS,
            "Running deployment"
        );

        let meth = self.deploy(deployer, METH_CONTRACT, &[]).await?;
        let mzama = self.deploy(deployer, MZAMA_CONTRACT, &[]).await?;
        let staking = self
            .deploy(deployer, STAKING_CONTRACT, &[meth.address, mzama.address])
            .await?;

        self.store.record_migration(DEPLOYMENT_ID, Utc::now())?;

        Ok(DeploymentSummary {
            skipped: false,
            contracts: vec![meth, mzama, staking],
        })
    }

    async fn deploy(
        &self,
        deployer: &dyn ContractDeployer,
        name: &'static str,
        args: &[Address],
    ) -> Result<ContractSummary, DeployError> {
        let artifact = ContractArtifact::load(&self.artifacts_dir, name)?;
        let encoded_args = encode_address_args(args);
        let deployment_hash = artifact.deployment_hash(&encoded_args);

        if let Some(existing) = self.store.load(name)? {
            if existing.deployment_hash == deployment_hash {
                tracing::info!(contract = name, address = %existing.address, "Reusing deployment");
                return Ok(ContractSummary {
                    name,
                    address: existing.address,
                    newly_deployed: false,
                });
            }
        }

        let deployed = deployer.deploy(&artifact, encoded_args).await?;
        tracing::info!(
            contract = name,
            address = %deployed.address,
            tx_hash = %deployed.tx_hash,
            "Contract deployed"
        );

        self.store.save(
            name,
            &DeploymentRecord {
                address: deployed.address,
                transaction_hash: deployed.tx_hash,
                block_number: deployed.block_number,
                args: args.to_vec(),
                abi: artifact.abi,
                deployment_hash,
                deployed_at: Utc::now(),
            },
        )?;

        Ok(ContractSummary {
            name,
            address: deployed.address,
            newly_deployed: true,
        })
    }

    fn recorded_summary(&self) -> Result<DeploymentSummary, DeployError> {
        let contracts = [METH_CONTRACT, MZAMA_CONTRACT, STAKING_CONTRACT]
            .into_iter()
            .map(|name| -> Result<ContractSummary, DeployError> {
                let record = self
                    .store
                    .load(name)?
                    .ok_or_else(|| DeployError::MissingRecord(name.to_string()))?;
                Ok(ContractSummary {
                    name,
                    address: record.address,
                    newly_deployed: false,
                })
            })
            .collect::<Result<Vec<_>, DeployError>>()?;

        Ok(DeploymentSummary {
            skipped: true,
            contracts,
        })
    }
}

/// ABI-encode constructor arguments that are all addresses.
fn encode_address_args(args: &[Address]) -> Bytes {
    DynSolValue::Tuple(args.iter().copied().map(DynSolValue::Address).collect())
        .abi_encode_params()
        .into()
}
