// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Action Orchestrator
//!
//! Sequences the claim, stake, withdraw and decrypt workflows for every
//! asset card and owns the session state they update.
//!
//! ## Flow
//!
//! 1. Validate the amount (claim/stake/withdraw).
//! 2. Check preconditions: configured asset, connected wallet, ready
//!    encryption service.
//! 3. Mark the action `Pending` (refused if it already is).
//! 4. Run the external steps strictly in order. The state lock is never
//!    held across an external call.
//! 5. Settle to `Succeeded` or `Failed` with one status message and arm
//!    the auto-clear timer.
//!
//! Validation and precondition failures set a status message and return
//! [`ActionOutcome::Rejected`] without touching any external service.
//! External failures are logged and collapsed into the action's generic
//! failure message.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tokio::sync::RwLock;

use crate::assets::Asset;
use crate::blockchain::{BalanceReader, ChainClientError, EncryptedHandle, Wallet};
use crate::relayer::{EncryptionService, RelayerError};

pub mod scheduler;
pub mod state;
pub mod validation;
mod workflows;

#[cfg(test)]
pub(crate) mod testing;

pub use scheduler::{StatusScheduler, STATUS_CLEAR_DELAY};
pub use state::{
    ActionKind, ActionSlots, ActionState, CardState, DecryptedBalances, DraftInputs,
    MissingHandlePolicy, SessionState,
};
pub use validation::parse_amount;

/// Validity window of a decryption authorization.
pub const DECRYPT_DURATION_DAYS: u64 = 10;

/// Result of triggering a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Refused before any external call.
    Rejected(&'static str),
    /// Confirmed. Carries the status message, if one was shown.
    Completed(Option<&'static str>),
    /// An external step failed; carries the generic message shown.
    Failed(&'static str),
}

impl ActionOutcome {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ActionOutcome::Rejected(m) | ActionOutcome::Failed(m) => Some(m),
            ActionOutcome::Completed(m) => *m,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionOutcome::Rejected(_) => "rejected",
            ActionOutcome::Completed(_) => "completed",
            ActionOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("{kind} is already in flight for {asset}")]
    AlreadyInFlight { asset: String, kind: ActionKind },

    #[error("Invalid amount for {0}")]
    InvalidAmount(ActionKind),

    #[error("Asset contracts are not configured")]
    NotConfigured,

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Encryption service not ready")]
    EncryptionNotReady,

    #[error(transparent)]
    Chain(#[from] ChainClientError),

    #[error(transparent)]
    Relayer(#[from] RelayerError),

    #[error("Decryption response is missing handle {0}")]
    MissingPlaintext(EncryptedHandle),
}

impl WorkflowError {
    /// Inline message for refusals that happen before any external call.
    ///
    /// Returns `None` for errors that never reach the status line.
    pub fn rejection_message(&self, kind: ActionKind) -> Option<&'static str> {
        match self {
            WorkflowError::InvalidAmount(_) => Some(kind.invalid_amount_message()),
            WorkflowError::NotConfigured => Some(NOT_CONFIGURED_MESSAGE),
            WorkflowError::WalletNotConnected => Some(kind.wallet_missing_message()),
            WorkflowError::EncryptionNotReady => Some(kind.encryption_loading_message()),
            _ => None,
        }
    }
}

pub const NOT_CONFIGURED_MESSAGE: &str = "Set contract addresses to activate this asset.";

/// Read-only view of the session handed to the presentation layer.
pub struct SessionSnapshot<'a> {
    pub account: Option<Address>,
    pub encryption_ready: bool,
    pub staking: Address,
    pub cards: &'a [CardState],
}

pub struct StakeOrchestrator {
    state: Arc<RwLock<SessionState>>,
    staking: Address,
    reader: Arc<dyn BalanceReader>,
    wallet: RwLock<Option<Arc<dyn Wallet>>>,
    encryption: RwLock<Option<Arc<dyn EncryptionService>>>,
    missing_handle_policy: MissingHandlePolicy,
    scheduler: StatusScheduler,
}

impl StakeOrchestrator {
    pub fn new(
        assets: Vec<Asset>,
        staking: Address,
        reader: Arc<dyn BalanceReader>,
        missing_handle_policy: MissingHandlePolicy,
    ) -> Self {
        Self::with_status_delay(
            assets,
            staking,
            reader,
            missing_handle_policy,
            STATUS_CLEAR_DELAY,
        )
    }

    pub fn with_status_delay(
        assets: Vec<Asset>,
        staking: Address,
        reader: Arc<dyn BalanceReader>,
        missing_handle_policy: MissingHandlePolicy,
        status_delay: Duration,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::new(assets))),
            staking,
            reader,
            wallet: RwLock::new(None),
            encryption: RwLock::new(None),
            missing_handle_policy,
            scheduler: StatusScheduler::new(status_delay),
        }
    }

    pub fn staking_address(&self) -> Address {
        self.staking
    }

    /// Asset keys in display order.
    pub async fn asset_keys(&self) -> Vec<&'static str> {
        let session = self.state.read().await;
        session.cards.iter().map(|card| card.asset.key).collect()
    }

    /// Attach a wallet session. Cached handles and decrypted values of a
    /// previous account are dropped.
    pub async fn connect_wallet(&self, wallet: Arc<dyn Wallet>) {
        let address = wallet.address();
        let previous = self.wallet.write().await.replace(wallet);
        if previous.map(|w| w.address()) != Some(address) {
            self.reset_account_data().await;
        }
        tracing::info!(account = %address, "Wallet connected");
    }

    pub async fn disconnect_wallet(&self) {
        if self.wallet.write().await.take().is_some() {
            self.reset_account_data().await;
            tracing::info!("Wallet disconnected");
        }
    }

    pub async fn account(&self) -> Option<Address> {
        self.wallet.read().await.as_ref().map(|w| w.address())
    }

    /// Mark the encryption service as initialized.
    pub async fn set_encryption_service(&self, service: Arc<dyn EncryptionService>) {
        *self.encryption.write().await = Some(service);
        tracing::info!("Encryption service ready");
    }

    pub async fn is_encryption_ready(&self) -> bool {
        self.encryption.read().await.is_some()
    }

    /// Run `f` against a consistent snapshot of the session.
    pub async fn with_snapshot<R>(&self, f: impl FnOnce(SessionSnapshot<'_>) -> R) -> R {
        let account = self.account().await;
        let encryption_ready = self.is_encryption_ready().await;
        let session = self.state.read().await;
        f(SessionSnapshot {
            account,
            encryption_ready,
            staking: self.staking,
            cards: &session.cards,
        })
    }

    /// Stop all pending status timers. No state is updated afterwards by
    /// the scheduler.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    async fn wallet(&self) -> Option<Arc<dyn Wallet>> {
        self.wallet.read().await.clone()
    }

    async fn encryption(&self) -> Option<Arc<dyn EncryptionService>> {
        self.encryption.read().await.clone()
    }

    async fn reset_account_data(&self) {
        let mut session = self.state.write().await;
        for card in session.cards.iter_mut() {
            card.reset_account_data();
        }
    }
}
