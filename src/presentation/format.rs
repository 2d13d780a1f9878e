// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Display strings for handles, addresses and balances.

use alloy::primitives::Address;

use crate::blockchain::{is_zero_handle, EncryptedHandle};

/// Shown in place of a plaintext until the user decrypts.
pub const UNREVEALED: &str = "Decrypt to reveal";

/// `Encrypted: 0x12345678...abcdef`, or `Encrypted: 0` for the zero handle.
pub fn format_handle(handle: Option<&EncryptedHandle>) -> String {
    match handle {
        Some(handle) if !is_zero_handle(Some(handle)) => {
            let hex = handle.to_string();
            format!("Encrypted: {}...{}", &hex[..10], &hex[hex.len() - 6..])
        }
        _ => "Encrypted: 0".to_string(),
    }
}

/// `0x1234...abcd` (first 6 and last 4 characters of the checksummed form).
pub fn short_address(address: Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

pub fn format_decrypted(value: Option<&str>, symbol: &str) -> String {
    match value {
        Some(value) => format!("{value} {symbol}"),
        None => UNREVEALED.to_string(),
    }
}
