// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    presentation::{
        AppView, AssetCardView, BalanceView, ButtonView, CardActionsView, DraftsView, HeaderView,
        HeroView,
    },
    state::AppState,
};

pub mod assets;
pub mod health;
pub mod session;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/app", get(assets::get_app))
        .route("/config", get(session::get_config))
        .route("/session/connect", post(session::connect))
        .route("/session/disconnect", post(session::disconnect))
        .route("/assets/{key}", get(assets::get_asset))
        .route("/assets/{key}/claim", post(assets::claim))
        .route("/assets/{key}/stake", post(assets::stake))
        .route("/assets/{key}/withdraw", post(assets::withdraw))
        .route("/assets/{key}/decrypt", post(assets::decrypt))
        .route("/assets/{key}/hide", post(assets::hide))
        .route("/assets/{key}/refresh", post(assets::refresh))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        assets::get_app,
        assets::get_asset,
        assets::claim,
        assets::stake,
        assets::withdraw,
        assets::decrypt,
        assets::hide,
        assets::refresh,
        session::get_config,
        session::connect,
        session::disconnect,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            AppView,
            HeaderView,
            HeroView,
            AssetCardView,
            BalanceView,
            ButtonView,
            CardActionsView,
            DraftsView,
            assets::AmountRequest,
            assets::ActionResponse,
            session::ConfigResponse,
            session::AssetAddress,
            session::SessionResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Assets", description = "Asset cards and staking actions"),
        (name = "Session", description = "Wallet session and deployment parameters"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
