// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Stakeable Assets
//!
//! Static descriptors for the two confidential tokens. Contract addresses
//! are injected from configuration; everything else is fixed at build time.

use alloy::primitives::Address;

/// Stable identifier for an asset card (`meth`, `mzama`).
pub type AssetKey = &'static str;

/// Immutable asset descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub key: AssetKey,
    pub name: &'static str,
    pub symbol: &'static str,
    /// Token contract address (zero when not configured)
    pub address: Address,
    pub accent: &'static str,
    pub accent_soft: &'static str,
    pub description: &'static str,
}

impl Asset {
    pub fn meth(address: Address) -> Self {
        Self {
            key: "meth",
            name: "mETH",
            symbol: "mETH",
            address,
            accent: "#22d3ee",
            accent_soft: "#0ea5e9",
            description: "Synthetic Ether with encrypted balances.",
        }
    }

    pub fn mzama(address: Address) -> Self {
        Self {
            key: "mzama",
            name: "mZama",
            symbol: "mZama",
            address,
            accent: "#fbbf24",
            accent_soft: "#f97316",
            description: "Confidential Zama-native staking asset.",
        }
    }

    /// Both the token and the staking contract must be deployed.
    pub fn is_configured(&self, staking: Address) -> bool {
        !self.address.is_zero() && !staking.is_zero()
    }
}

/// The asset list shown by the app, in display order.
pub fn default_assets(meth: Address, mzama: Address) -> Vec<Asset> {
    vec![Asset::meth(meth), Asset::mzama(mzama)]
}
