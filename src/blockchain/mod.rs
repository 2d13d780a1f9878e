// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for Sepolia.
//!
//! This module provides functionality for:
//! - Reading confidential wallet and staked balance handles
//! - Signing decryption authorizations (EIP-712)
//! - Submitting claim, stake and withdraw transactions

pub mod client;
pub mod contracts;
pub mod signing;
pub mod types;
pub mod wallet;

pub use client::{BalanceReader, ChainClientError, SepoliaClient};
pub use types::*;
pub use wallet::{ContractCall, LocalWallet, Wallet};
