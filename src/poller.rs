// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance Poller
//!
//! Background task that periodically re-reads the encrypted balance handles
//! of every asset card, so new handles show up even when no action was
//! triggered from this session (e.g. a transfer made from another client).
//!
//! Each sweep is a no-op while no wallet is connected. Read failures are
//! logged by the orchestrator and keep the previous handles.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::orchestrator::StakeOrchestrator;

pub struct BalancePoller {
    orchestrator: Arc<StakeOrchestrator>,
    poll_interval: Duration,
}

impl BalancePoller {
    pub fn new(orchestrator: Arc<StakeOrchestrator>, poll_interval: Duration) -> Self {
        Self {
            orchestrator,
            poll_interval,
        }
    }

    /// Run the poller loop until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Balance poller starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Balance poller shutting down");
                    return;
                }
            }

            if self.orchestrator.account().await.is_none() {
                continue;
            }
            debug!("Balance poller: refreshing handles");
            self.orchestrator.refresh_all().await;
        }
    }
}
