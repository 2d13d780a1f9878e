// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Presentation layer: display formatting and the serializable page state.

pub mod format;
pub mod views;

pub use format::{format_decrypted, format_handle, short_address};
pub use views::{
    button_label, AppView, AssetCardView, BalanceView, ButtonView, CardActionsView, DraftsView,
    HeaderView, HeroView,
};
