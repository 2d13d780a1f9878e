// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use ghost_stake::api::router;
use ghost_stake::assets::default_assets;
use ghost_stake::blockchain::{LocalWallet, SepoliaClient, Wallet, SEPOLIA};
use ghost_stake::config::{AppConfig, LogFormat};
use ghost_stake::orchestrator::StakeOrchestrator;
use ghost_stake::poller::BalancePoller;
use ghost_stake::relayer::FheBridgeClient;
use ghost_stake::state::AppState;
use ghost_stake::telemetry::init_tracing;

const BRIDGE_READY_POLL: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let reader = SepoliaClient::new(SEPOLIA, &config.rpc_url)?;
    let orchestrator = Arc::new(StakeOrchestrator::new(
        default_assets(config.meth_address, config.mzama_address),
        config.staking_address,
        Arc::new(reader),
        config.missing_handle_policy,
    ));

    let session_wallet: Option<Arc<dyn Wallet>> = match &config.wallet_key {
        Some(source) => {
            let wallet = LocalWallet::new(SEPOLIA, &config.rpc_url, source.load()?)?;
            Some(Arc::new(wallet))
        }
        None => {
            warn!("No wallet key configured, session connect is unavailable");
            None
        }
    };

    let shutdown = CancellationToken::new();

    if let Some(url) = &config.fhe_bridge_url {
        let bridge = FheBridgeClient::new(url, config.decryption_domain)?;
        tokio::spawn(wait_for_bridge(
            orchestrator.clone(),
            bridge,
            shutdown.clone(),
        ));
    } else {
        warn!("FHE_BRIDGE_URL not set, encryption stays unavailable");
    }

    if let Some(wallet) = &session_wallet {
        orchestrator.connect_wallet(wallet.clone()).await;
        orchestrator.refresh_all().await;
    }

    if let Some(interval) = config.balance_poll_interval {
        let poller = BalancePoller::new(orchestrator.clone(), interval);
        tokio::spawn(poller.run(shutdown.clone()));
    }

    let addr = config.bind_address();
    let state = AppState::new(orchestrator.clone(), config, session_wallet);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Ghost Stake listening (docs at /docs)");

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutting down");
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    orchestrator.shutdown();
    Ok(())
}

/// Poll the bridge until its FHE instance is initialized, then hand it to
/// the orchestrator.
async fn wait_for_bridge(
    orchestrator: Arc<StakeOrchestrator>,
    bridge: FheBridgeClient,
    shutdown: CancellationToken,
) {
    info!(url = %bridge.base_url(), "Waiting for FHE bridge");
    loop {
        if bridge.is_ready().await {
            orchestrator.set_encryption_service(Arc::new(bridge)).await;
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(BRIDGE_READY_POLL) => {},
            _ = shutdown.cancelled() => return,
        }
    }
}
