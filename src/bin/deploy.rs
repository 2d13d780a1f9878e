// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deploys ConfidentialMETH, ConfidentialMZama and ConfidentialStaking to
//! Sepolia from Hardhat artifacts.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use ghost_stake::blockchain::{ensure_sepolia_network, NETWORK_SEPOLIA, SEPOLIA};
use ghost_stake::config::{LogFormat, WalletKeySource};
use ghost_stake::deploy::{AlloyDeployer, ConfidentialStakeDeployment, DeploymentStore};
use ghost_stake::telemetry::init_tracing;

#[derive(Parser, Debug, Clone)]
#[command(name = "ghost-stake-deploy")]
#[command(about = "Deploy the Ghost Stake confidential contracts", long_about = None)]
struct Args {
    /// Target network (only `sepolia` is supported)
    #[arg(long, default_value = NETWORK_SEPOLIA, env = "NETWORK")]
    network: String,

    /// Sepolia JSON-RPC endpoint
    #[arg(long, default_value = SEPOLIA.rpc_url, env = "RPC_URL")]
    rpc_url: String,

    /// PEM file holding the deployer key (takes precedence over --private-key)
    #[arg(long, env = "DEPLOYER_KEY_PATH")]
    key_file: Option<PathBuf>,

    /// Deployer key as hex
    #[arg(long, env = "DEPLOYER_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Directory holding the compiled Hardhat artifacts
    #[arg(long, default_value = "artifacts", env = "ARTIFACTS_DIR")]
    artifacts: PathBuf,

    /// Directory holding per-network deployment records
    #[arg(long, default_value = "deployments", env = "DEPLOYMENTS_DIR")]
    deployments: PathBuf,

    /// Ignore previous runs and deploy everything again
    #[arg(long, default_value_t = false)]
    reset: bool,

    /// Emit JSON logs instead of pretty ones
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

impl Args {
    fn key_source(&self) -> Option<WalletKeySource> {
        match (&self.key_file, &self.private_key) {
            (Some(path), _) => Some(WalletKeySource::PemFile(path.clone())),
            (None, Some(hex)) => Some(WalletKeySource::Hex(hex.clone())),
            (None, None) => None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    });

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Deployment failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    ensure_sepolia_network(Some(&args.network))?;

    let signer = args
        .key_source()
        .ok_or("a deployer key is required (--key-file or --private-key)")?
        .load()?;

    let deployer = AlloyDeployer::new(SEPOLIA, &args.rpc_url, signer)?;
    deployer.ensure_chain().await?;

    let store = DeploymentStore::new(&args.deployments, NETWORK_SEPOLIA);
    let summary = ConfidentialStakeDeployment::new(store, &args.artifacts, args.reset)
        .run(&deployer)
        .await?;

    if summary.skipped {
        tracing::info!("Nothing to deploy, recorded addresses follow");
    }
    print!("{summary}");
    Ok(())
}
