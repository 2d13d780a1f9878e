// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, B256};

/// EVM network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Ethereum Sepolia testnet configuration.
pub const SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Sepolia",
    chain_id: 11_155_111,
    rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    explorer_url: "https://sepolia.etherscan.io",
};

/// Supported network identifier for this build.
pub const NETWORK_SEPOLIA: &str = "sepolia";

/// Validate network input for the Sepolia-only runtime.
pub fn ensure_sepolia_network(raw: Option<&str>) -> Result<(), String> {
    let value = raw.unwrap_or(NETWORK_SEPOLIA).trim().to_ascii_lowercase();
    if value == NETWORK_SEPOLIA {
        Ok(())
    } else {
        Err(format!(
            "Only `{NETWORK_SEPOLIA}` network is supported in this deployment."
        ))
    }
}

/// Opaque on-chain reference to a ciphertext.
///
/// The all-zero handle means no confidential value has been set for the
/// slot and is always read as zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EncryptedHandle(pub B256);

impl EncryptedHandle {
    pub const ZERO: Self = Self(B256::ZERO);

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// Absent handles (not read yet) count as zero.
pub fn is_zero_handle(handle: Option<&EncryptedHandle>) -> bool {
    handle.is_none_or(EncryptedHandle::is_zero)
}

impl From<B256> for EncryptedHandle {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl FromStr for EncryptedHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s.trim())
            .map(Self)
            .map_err(|e| format!("invalid handle `{s}`: {e}"))
    }
}

impl fmt::Display for EncryptedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&alloy::hex::encode_prefixed(self.0))
    }
}

impl fmt::Debug for EncryptedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedHandle({self})")
    }
}

/// Outcome of a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    /// Transaction hash
    pub tx_hash: B256,
    /// Block number where the transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
}

/// Parse a `0x`-prefixed contract address, treating blanks as unset.
pub fn parse_address(raw: &str) -> Result<Address, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Address::ZERO);
    }
    Address::from_str(trimmed).map_err(|e| format!("invalid address `{trimmed}`: {e}"))
}
