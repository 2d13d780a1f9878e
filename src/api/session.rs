// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    blockchain::{NETWORK_SEPOLIA, SEPOLIA},
    error::ApiError,
    presentation::short_address,
    state::AppState,
};

/// Deployment parameters a client needs to talk to the contracts itself.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ConfigResponse {
    pub network: String,
    pub chain_id: u64,
    pub explorer_url: String,
    pub walletconnect_project_id: String,
    pub staking_address: String,
    pub assets: Vec<AssetAddress>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct AssetAddress {
    pub key: String,
    pub symbol: String,
    pub address: String,
    pub configured: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct SessionResponse {
    /// Checksummed account address when connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// `0x1234...abcd` form of the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_account: Option<String>,
    pub encryption_ready: bool,
}

async fn session_response(state: &AppState) -> SessionResponse {
    let account = state.orchestrator.account().await;
    SessionResponse {
        account: account.map(|a| a.to_checksum(None)),
        short_account: account.map(short_address),
        encryption_ready: state.orchestrator.is_encryption_ready().await,
    }
}

#[utoipa::path(
    get,
    path = "/v1/config",
    tag = "Session",
    responses((status = 200, body = ConfigResponse))
)]
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let staking = state.orchestrator.staking_address();
    let assets = state
        .orchestrator
        .with_snapshot(|snapshot| {
            snapshot
                .cards
                .iter()
                .map(|card| AssetAddress {
                    key: card.asset.key.to_string(),
                    symbol: card.asset.symbol.to_string(),
                    address: card.asset.address.to_checksum(None),
                    configured: card.asset.is_configured(staking),
                })
                .collect()
        })
        .await;

    Json(ConfigResponse {
        network: NETWORK_SEPOLIA.to_string(),
        chain_id: SEPOLIA.chain_id,
        explorer_url: SEPOLIA.explorer_url.to_string(),
        walletconnect_project_id: state.config.walletconnect_project_id.clone(),
        staking_address: staking.to_checksum(None),
        assets,
    })
}

/// Attach the configured session wallet and read its balances.
#[utoipa::path(
    post,
    path = "/v1/session/connect",
    tag = "Session",
    responses(
        (status = 200, body = SessionResponse),
        (status = 503, description = "No wallet key configured")
    )
)]
pub async fn connect(State(state): State<AppState>) -> Result<Json<SessionResponse>, ApiError> {
    let wallet = state
        .session_wallet
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("No wallet key configured"))?;
    state.orchestrator.connect_wallet(Arc::clone(wallet)).await;
    state.orchestrator.refresh_all().await;
    Ok(Json(session_response(&state).await))
}

#[utoipa::path(
    post,
    path = "/v1/session/disconnect",
    tag = "Session",
    responses((status = 200, body = SessionResponse))
)]
pub async fn disconnect(State(state): State<AppState>) -> Json<SessionResponse> {
    state.orchestrator.disconnect_wallet().await;
    Json(session_response(&state).await)
}
