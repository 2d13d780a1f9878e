// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # View Models
//!
//! Serializable page state: header, hero and one card per asset. Every
//! string a client renders (labels, balances, status lines) is decided
//! here so the HTTP layer only serializes.

use serde::Serialize;
use utoipa::ToSchema;

use super::format::{format_decrypted, format_handle, short_address};
use crate::orchestrator::{ActionKind, CardState, SessionSnapshot, NOT_CONFIGURED_MESSAGE};

/// Page header.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct HeaderView {
    pub brand_mark: String,
    pub title: String,
    pub subtitle: String,
}

impl Default for HeaderView {
    fn default() -> Self {
        Self {
            brand_mark: "GS".to_string(),
            title: "Ghost Stake".to_string(),
            subtitle: "Encrypted staking for mETH and mZama".to_string(),
        }
    }
}

/// Introductory section with the connection pills.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct HeroView {
    pub kicker: String,
    pub title: String,
    pub description: String,
    /// `Connected: 0x1234...abcd` or a connect prompt.
    pub account_pill: String,
    pub network_pill: String,
    pub steps: Vec<String>,
}

impl HeroView {
    fn new(snapshot: &SessionSnapshot<'_>) -> Self {
        let account_pill = match snapshot.account {
            Some(account) => format!("Connected: {}", short_address(account)),
            None => "Connect wallet to begin".to_string(),
        };
        Self {
            kicker: "Confidential staking".to_string(),
            title: "Stake without revealing balances.".to_string(),
            description: "Claim mETH or mZama, stake instantly, and decrypt your balances only \
                          when you want to see them."
                .to_string(),
            account_pill,
            network_pill: "Sepolia network".to_string(),
            steps: vec![
                "Claim encrypted mETH or mZama.".to_string(),
                "Stake via confidential transfer and call.".to_string(),
                "Withdraw anytime, decrypt balances on demand.".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ButtonView {
    pub label: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct BalanceView {
    /// Raw handle, when one has been read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// `Encrypted: ...` line.
    pub encrypted: String,
    /// `<value> <symbol>` or `Decrypt to reveal`.
    pub decrypted: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct CardActionsView {
    pub claim: ButtonView,
    pub stake: ButtonView,
    pub withdraw: ButtonView,
    pub decrypt: ButtonView,
    pub hide: ButtonView,
}

/// Last submitted amount text per input field.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct DraftsView {
    pub claim: String,
    pub stake: String,
    pub withdraw: String,
}

/// Everything rendered for one asset.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct AssetCardView {
    pub key: String,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub address: String,
    pub accent: String,
    pub accent_soft: String,
    pub configured: bool,
    pub wallet_balance: BalanceView,
    pub staked_balance: BalanceView,
    pub drafts: DraftsView,
    pub actions: CardActionsView,
    /// Status line under the card. The configuration notice wins over any
    /// workflow message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl AssetCardView {
    pub fn new(snapshot: &SessionSnapshot<'_>, card: &CardState) -> Self {
        let asset = &card.asset;
        let configured = asset.is_configured(snapshot.staking);
        let claim_disabled = snapshot.account.is_none() || !configured;
        // Claim sends a plaintext amount and works without the encryption service.
        let action_disabled = claim_disabled || !snapshot.encryption_ready;

        let button = |kind: ActionKind| {
            let pending = card.actions.get(kind).is_pending();
            let blocked = match kind {
                ActionKind::Claim => claim_disabled,
                _ => action_disabled,
            };
            ButtonView {
                label: button_label(kind, pending).to_string(),
                disabled: blocked || pending,
            }
        };

        let decrypted = card.decrypted.as_ref();
        let status = if configured {
            card.status.map(str::to_string)
        } else {
            Some(NOT_CONFIGURED_MESSAGE.to_string())
        };

        Self {
            key: asset.key.to_string(),
            name: asset.name.to_string(),
            symbol: asset.symbol.to_string(),
            description: asset.description.to_string(),
            address: asset.address.to_checksum(None),
            accent: asset.accent.to_string(),
            accent_soft: asset.accent_soft.to_string(),
            configured,
            wallet_balance: BalanceView {
                handle: card.wallet_handle.map(|h| h.to_string()),
                encrypted: format_handle(card.wallet_handle.as_ref()),
                decrypted: format_decrypted(decrypted.map(|d| d.wallet.as_str()), asset.symbol),
            },
            staked_balance: BalanceView {
                handle: card.staked_handle.map(|h| h.to_string()),
                encrypted: format_handle(card.staked_handle.as_ref()),
                decrypted: format_decrypted(decrypted.map(|d| d.staked.as_str()), asset.symbol),
            },
            drafts: DraftsView {
                claim: card.drafts.claim.clone(),
                stake: card.drafts.stake.clone(),
                withdraw: card.drafts.withdraw.clone(),
            },
            actions: CardActionsView {
                claim: button(ActionKind::Claim),
                stake: button(ActionKind::Stake),
                withdraw: button(ActionKind::Withdraw),
                decrypt: button(ActionKind::Decrypt),
                hide: ButtonView {
                    label: "Hide decrypted".to_string(),
                    disabled: action_disabled,
                },
            },
            status,
        }
    }
}

pub fn button_label(kind: ActionKind, pending: bool) -> &'static str {
    match (kind, pending) {
        (ActionKind::Claim, false) => "Claim",
        (ActionKind::Claim, true) => "Claiming...",
        (ActionKind::Stake, false) => "Stake",
        (ActionKind::Stake, true) => "Staking...",
        (ActionKind::Withdraw, false) => "Withdraw",
        (ActionKind::Withdraw, true) => "Withdrawing...",
        (ActionKind::Decrypt, false) => "Decrypt balances",
        (ActionKind::Decrypt, true) => "Decrypting...",
    }
}

/// The whole page.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct AppView {
    pub header: HeaderView,
    pub hero: HeroView,
    pub cards: Vec<AssetCardView>,
}

impl AppView {
    pub fn new(snapshot: &SessionSnapshot<'_>) -> Self {
        Self {
            header: HeaderView::default(),
            hero: HeroView::new(snapshot),
            cards: snapshot
                .cards
                .iter()
                .map(|card| AssetCardView::new(snapshot, card))
                .collect(),
        }
    }
}
