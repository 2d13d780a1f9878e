// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-asset session state.

use std::fmt;
use std::str::FromStr;

use tokio_util::sync::CancellationToken;

use crate::assets::Asset;
use crate::blockchain::EncryptedHandle;

/// The four user-triggered workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Claim,
    Stake,
    Withdraw,
    Decrypt,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Claim,
        ActionKind::Stake,
        ActionKind::Withdraw,
        ActionKind::Decrypt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Claim => "claim",
            ActionKind::Stake => "stake",
            ActionKind::Withdraw => "withdraw",
            ActionKind::Decrypt => "decrypt",
        }
    }

    pub fn invalid_amount_message(&self) -> &'static str {
        match self {
            ActionKind::Claim => "Enter a whole number to claim.",
            ActionKind::Stake => "Enter a whole number to stake.",
            ActionKind::Withdraw => "Enter a whole number to withdraw.",
            ActionKind::Decrypt => "Enter a whole number.",
        }
    }

    pub fn wallet_missing_message(&self) -> &'static str {
        match self {
            ActionKind::Claim => "Connect wallet to claim.",
            ActionKind::Stake => "Connect wallet to stake.",
            ActionKind::Withdraw => "Connect wallet to withdraw.",
            ActionKind::Decrypt => "Connect wallet to decrypt balances.",
        }
    }

    pub fn encryption_loading_message(&self) -> &'static str {
        match self {
            ActionKind::Decrypt => "Connect wallet to decrypt balances.",
            _ => "Encryption service is still loading.",
        }
    }

    pub fn pending_message(&self) -> &'static str {
        match self {
            ActionKind::Claim => "Submitting claim...",
            ActionKind::Stake => "Encrypting stake amount...",
            ActionKind::Withdraw => "Encrypting withdrawal amount...",
            ActionKind::Decrypt => "Preparing decryption...",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            ActionKind::Claim => "Claim confirmed on-chain.",
            ActionKind::Stake => "Stake confirmed on-chain.",
            ActionKind::Withdraw => "Withdrawal confirmed on-chain.",
            ActionKind::Decrypt => "Decryption complete.",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            ActionKind::Claim => "Claim failed. Check wallet connection.",
            ActionKind::Stake => "Stake failed. Check balance and wallet.",
            ActionKind::Withdraw => "Withdrawal failed. Check staked balance.",
            ActionKind::Decrypt => "Decryption failed. Try again.",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one operation on one asset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(&'static str),
}

impl ActionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ActionState::Pending)
    }

    fn is_settled(&self) -> bool {
        matches!(self, ActionState::Succeeded | ActionState::Failed(_))
    }
}

/// One state slot per [`ActionKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSlots {
    claim: ActionState,
    stake: ActionState,
    withdraw: ActionState,
    decrypt: ActionState,
}

impl ActionSlots {
    pub fn get(&self, kind: ActionKind) -> &ActionState {
        match kind {
            ActionKind::Claim => &self.claim,
            ActionKind::Stake => &self.stake,
            ActionKind::Withdraw => &self.withdraw,
            ActionKind::Decrypt => &self.decrypt,
        }
    }

    fn get_mut(&mut self, kind: ActionKind) -> &mut ActionState {
        match kind {
            ActionKind::Claim => &mut self.claim,
            ActionKind::Stake => &mut self.stake,
            ActionKind::Withdraw => &mut self.withdraw,
            ActionKind::Decrypt => &mut self.decrypt,
        }
    }
}

/// Last submitted amount text per amount-taking action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftInputs {
    pub claim: String,
    pub stake: String,
    pub withdraw: String,
}

impl DraftInputs {
    pub fn get(&self, kind: ActionKind) -> &str {
        match kind {
            ActionKind::Claim => &self.claim,
            ActionKind::Stake => &self.stake,
            ActionKind::Withdraw => &self.withdraw,
            ActionKind::Decrypt => "",
        }
    }

    pub fn set(&mut self, kind: ActionKind, value: &str) {
        match kind {
            ActionKind::Claim => self.claim = value.to_string(),
            ActionKind::Stake => self.stake = value.to_string(),
            ActionKind::Withdraw => self.withdraw = value.to_string(),
            ActionKind::Decrypt => {}
        }
    }

    pub fn clear(&mut self, kind: ActionKind) {
        self.set(kind, "");
    }
}

/// Plaintext balances revealed by a successful decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedBalances {
    pub wallet: String,
    pub staked: String,
}

/// What to do when the relayer omits a requested handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingHandlePolicy {
    /// Show the slot as "0".
    #[default]
    TreatAsZero,
    /// Fail the whole decryption.
    Fail,
}

impl FromStr for MissingHandlePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(MissingHandlePolicy::TreatAsZero),
            "error" | "fail" => Ok(MissingHandlePolicy::Fail),
            other => Err(format!(
                "unknown missing-handle policy `{other}` (expected `zero` or `error`)"
            )),
        }
    }
}

/// Everything the session tracks for one asset card.
#[derive(Debug)]
pub struct CardState {
    pub asset: Asset,
    pub wallet_handle: Option<EncryptedHandle>,
    pub staked_handle: Option<EncryptedHandle>,
    pub decrypted: Option<DecryptedBalances>,
    pub actions: ActionSlots,
    pub drafts: DraftInputs,
    pub status: Option<&'static str>,
    pub(crate) status_timer: Option<CancellationToken>,
}

impl CardState {
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            wallet_handle: None,
            staked_handle: None,
            decrypted: None,
            actions: ActionSlots::default(),
            drafts: DraftInputs::default(),
            status: None,
            status_timer: None,
        }
    }

    pub(crate) fn begin(&mut self, kind: ActionKind) {
        *self.actions.get_mut(kind) = ActionState::Pending;
        self.status = Some(kind.pending_message());
    }

    pub(crate) fn succeed(&mut self, kind: ActionKind) {
        *self.actions.get_mut(kind) = ActionState::Succeeded;
        self.status = Some(kind.success_message());
    }

    pub(crate) fn fail(&mut self, kind: ActionKind) {
        let message = kind.failure_message();
        *self.actions.get_mut(kind) = ActionState::Failed(message);
        self.status = Some(message);
    }

    /// Drop the status line and return settled actions to idle.
    pub(crate) fn clear_status(&mut self) {
        self.status = None;
        self.status_timer = None;
        for kind in ActionKind::ALL {
            let slot = self.actions.get_mut(kind);
            if slot.is_settled() {
                *slot = ActionState::Idle;
            }
        }
    }

    /// Forget everything tied to the previously connected account.
    pub(crate) fn reset_account_data(&mut self) {
        self.wallet_handle = None;
        self.staked_handle = None;
        self.decrypted = None;
    }
}

/// In-memory state for one rendered session.
#[derive(Debug, Default)]
pub struct SessionState {
    pub cards: Vec<CardState>,
}

impl SessionState {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            cards: assets.into_iter().map(CardState::new).collect(),
        }
    }

    pub fn card(&self, key: &str) -> Option<&CardState> {
        self.cards.iter().find(|card| card.asset.key == key)
    }

    pub fn card_mut(&mut self, key: &str) -> Option<&mut CardState> {
        self.cards.iter_mut().find(|card| card.asset.key == key)
    }
}
