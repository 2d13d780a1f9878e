// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Amount input validation.

/// Largest whole number that survives a round-trip through `f64`.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Parse a user-supplied amount.
///
/// Accepts only finite, strictly positive whole numbers. Digit strings are
/// parsed exactly; decimal or exponent notation (`5.0`, `1e3`) is accepted
/// when it denotes a whole number up to [`MAX_SAFE_INTEGER`].
pub fn parse_amount(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse::<u64>().ok().filter(|amount| *amount > 0);
    }

    let parsed: f64 = trimmed.parse().ok()?;
    if !parsed.is_finite()
        || parsed <= 0.0
        || parsed.fract() != 0.0
        || parsed > MAX_SAFE_INTEGER as f64
    {
        return None;
    }
    Some(parsed as u64)
}
