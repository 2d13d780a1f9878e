// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed-data authorization for user decryption.

use alloy::{
    primitives::{address, Address, Bytes, U256},
    sol,
    sol_types::Eip712Domain,
};

use super::RelayerError;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct UserDecryptRequestVerification {
        bytes publicKey;
        address[] contractAddresses;
        uint256 startTimestamp;
        uint256 durationDays;
        bytes extraData;
    }
}

/// Gateway chain id used by the Sepolia decryption domain.
pub const SEPOLIA_GATEWAY_CHAIN_ID: u64 = 55_815;

/// Decryption verifying contract on the Sepolia gateway.
pub const SEPOLIA_DECRYPTION_CONTRACT: Address =
    address!("0xb6E160B1ff80D67Bfe90A85eE06Ce0A2613607D1");

/// Where decryption authorizations are verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptionDomain {
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl DecryptionDomain {
    pub fn sepolia() -> Self {
        Self {
            chain_id: SEPOLIA_GATEWAY_CHAIN_ID,
            verifying_contract: SEPOLIA_DECRYPTION_CONTRACT,
        }
    }

    pub fn to_eip712_domain(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some("Decryption".into()),
            Some("1".into()),
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
    }
}

/// Domain plus message, ready for the wallet to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Payload {
    pub domain: Eip712Domain,
    pub message: UserDecryptRequestVerification,
}

/// Build the authorization binding a public key to a set of contracts for
/// `duration_days` starting at `start_timestamp` (unix seconds).
pub fn create_eip712(
    domain: &DecryptionDomain,
    public_key: &str,
    contract_addresses: &[Address],
    start_timestamp: u64,
    duration_days: u64,
) -> Result<Eip712Payload, RelayerError> {
    let public_key = alloy::hex::decode(public_key.trim())
        .map_err(|e| RelayerError::InvalidPublicKey(e.to_string()))?;

    Ok(Eip712Payload {
        domain: domain.to_eip712_domain(),
        message: UserDecryptRequestVerification {
            publicKey: Bytes::from(public_key),
            contractAddresses: contract_addresses.to_vec(),
            startTimestamp: U256::from(start_timestamp),
            durationDays: U256::from(duration_days),
            extraData: Bytes::from_static(&[0x00]),
        },
    })
}
