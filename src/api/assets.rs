// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    orchestrator::{ActionOutcome, WorkflowError},
    presentation::{AppView, AssetCardView},
    state::AppState,
};

/// Amount typed into a card input.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AmountRequest {
    /// Whole number of tokens, e.g. `"5"`.
    pub amount: String,
}

/// Result of triggering a card action, with the card re-rendered.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActionResponse {
    /// `completed`, `rejected` or `failed`.
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub card: AssetCardView,
}

pub(crate) async fn render_card(state: &AppState, key: &str) -> Result<AssetCardView, ApiError> {
    state
        .orchestrator
        .with_snapshot(|snapshot| {
            snapshot
                .cards
                .iter()
                .find(|card| card.asset.key == key)
                .map(|card| AssetCardView::new(&snapshot, card))
        })
        .await
        .ok_or_else(|| WorkflowError::UnknownAsset(key.to_string()).into())
}

async fn respond(
    state: &AppState,
    key: &str,
    outcome: Result<ActionOutcome, WorkflowError>,
) -> Result<Json<ActionResponse>, ApiError> {
    let outcome = outcome?;
    Ok(Json(ActionResponse {
        outcome: outcome.label().to_string(),
        message: outcome.message().map(str::to_string),
        card: render_card(state, key).await?,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/app",
    tag = "Assets",
    responses((status = 200, body = AppView))
)]
pub async fn get_app(State(state): State<AppState>) -> Json<AppView> {
    Json(
        state
            .orchestrator
            .with_snapshot(|snapshot| AppView::new(&snapshot))
            .await,
    )
}

#[utoipa::path(
    get,
    path = "/v1/assets/{key}",
    params(("key" = String, Path, description = "Asset key (`meth` or `mzama`)")),
    tag = "Assets",
    responses(
        (status = 200, body = AssetCardView),
        (status = 404, description = "Unknown asset")
    )
)]
pub async fn get_asset(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AssetCardView>, ApiError> {
    Ok(Json(render_card(&state, &key).await?))
}

#[utoipa::path(
    post,
    path = "/v1/assets/{key}/claim",
    params(("key" = String, Path, description = "Asset key")),
    request_body = AmountRequest,
    tag = "Assets",
    responses(
        (status = 200, body = ActionResponse),
        (status = 404, description = "Unknown asset"),
        (status = 409, description = "A claim is already in flight")
    )
)]
pub async fn claim(
    Path(key): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let outcome = state.orchestrator.claim(&key, &request.amount).await;
    respond(&state, &key, outcome).await
}

#[utoipa::path(
    post,
    path = "/v1/assets/{key}/stake",
    params(("key" = String, Path, description = "Asset key")),
    request_body = AmountRequest,
    tag = "Assets",
    responses(
        (status = 200, body = ActionResponse),
        (status = 404, description = "Unknown asset"),
        (status = 409, description = "A stake is already in flight")
    )
)]
pub async fn stake(
    Path(key): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let outcome = state.orchestrator.stake(&key, &request.amount).await;
    respond(&state, &key, outcome).await
}

#[utoipa::path(
    post,
    path = "/v1/assets/{key}/withdraw",
    params(("key" = String, Path, description = "Asset key")),
    request_body = AmountRequest,
    tag = "Assets",
    responses(
        (status = 200, body = ActionResponse),
        (status = 404, description = "Unknown asset"),
        (status = 409, description = "A withdrawal is already in flight")
    )
)]
pub async fn withdraw(
    Path(key): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let outcome = state.orchestrator.withdraw(&key, &request.amount).await;
    respond(&state, &key, outcome).await
}

#[utoipa::path(
    post,
    path = "/v1/assets/{key}/decrypt",
    params(("key" = String, Path, description = "Asset key")),
    tag = "Assets",
    responses(
        (status = 200, body = ActionResponse),
        (status = 404, description = "Unknown asset"),
        (status = 409, description = "A decryption is already in flight")
    )
)]
pub async fn decrypt(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, ApiError> {
    let outcome = state.orchestrator.decrypt(&key).await;
    respond(&state, &key, outcome).await
}

#[utoipa::path(
    post,
    path = "/v1/assets/{key}/hide",
    params(("key" = String, Path, description = "Asset key")),
    tag = "Assets",
    responses(
        (status = 200, body = ActionResponse),
        (status = 404, description = "Unknown asset")
    )
)]
pub async fn hide(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, ApiError> {
    let hidden = state.orchestrator.hide_decrypted(&key).await?;
    Ok(Json(ActionResponse {
        outcome: if hidden { "completed" } else { "rejected" }.to_string(),
        message: None,
        card: render_card(&state, &key).await?,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/assets/{key}/refresh",
    params(("key" = String, Path, description = "Asset key")),
    tag = "Assets",
    responses(
        (status = 200, body = AssetCardView),
        (status = 404, description = "Unknown asset")
    )
)]
pub async fn refresh(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AssetCardView>, ApiError> {
    state.orchestrator.refresh_balances(&key).await?;
    Ok(Json(render_card(&state, &key).await?))
}
