// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ghost Stake - Confidential Token Staking Service
//!
//! Session service for claiming, staking, withdrawing and decrypting
//! confidential mETH and mZama balances on Sepolia, plus the deployment
//! script for the token and staking contracts.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Sepolia contract bindings, reads and the wallet seam
//! - `relayer` - FHE encryption and user decryption service
//! - `orchestrator` - Per-asset session state and the action workflows
//! - `presentation` - Card and page view models
//! - `deploy` - Contract deployment from Hardhat artifacts

pub mod api;
pub mod assets;
pub mod blockchain;
pub mod config;
pub mod deploy;
pub mod error;
pub mod orchestrator;
pub mod poller;
pub mod presentation;
pub mod relayer;
pub mod state;
pub mod telemetry;
