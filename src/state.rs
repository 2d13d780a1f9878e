// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::Wallet;
use crate::config::AppConfig;
use crate::orchestrator::StakeOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<StakeOrchestrator>,
    pub config: Arc<AppConfig>,
    /// Wallet attached by `POST /v1/session/connect`, if a key is configured.
    pub session_wallet: Option<Arc<dyn Wallet>>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<StakeOrchestrator>,
        config: AppConfig,
        session_wallet: Option<Arc<dyn Wallet>>,
    ) -> Self {
        Self {
            orchestrator,
            config: Arc::new(config),
            session_wallet,
        }
    }
}
