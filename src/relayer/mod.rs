// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encryption service client.
//!
//! The confidential-computing SDK produces encrypted inputs with validity
//! proofs, ephemeral decryption key pairs and plaintexts for authorized
//! handles. This module defines that seam ([`EncryptionService`]) and the
//! HTTP adapter used in production ([`FheBridgeClient`]).

use std::collections::HashMap;
use std::fmt;

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;

use crate::blockchain::EncryptedHandle;

pub mod bridge;
pub mod eip712;

pub use bridge::FheBridgeClient;
pub use eip712::{create_eip712, DecryptionDomain, Eip712Payload, UserDecryptRequestVerification};

/// Plaintexts keyed by the handle they were decrypted from.
pub type DecryptedValues = HashMap<EncryptedHandle, String>;

/// A single plaintext value queued for encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlainValue {
    U64(u64),
}

/// Builder for an encrypted input bound to a consuming contract and user.
///
/// ```rust,ignore
/// let input = EncryptedInput::new(asset, user).add64(5);
/// let payload = service.encrypt(input).await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInput {
    contract: Address,
    user: Address,
    values: Vec<PlainValue>,
}

impl EncryptedInput {
    pub fn new(contract: Address, user: Address) -> Self {
        Self {
            contract,
            user,
            values: Vec::new(),
        }
    }

    pub fn add64(mut self, value: u64) -> Self {
        self.values.push(PlainValue::U64(value));
        self
    }

    /// Contract that will consume the ciphertext.
    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn user(&self) -> Address {
        self.user
    }

    pub fn values(&self) -> &[PlainValue] {
        &self.values
    }
}

/// Ciphertext handles plus the proof that they are well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub handles: Vec<EncryptedHandle>,
    pub input_proof: Bytes,
}

impl EncryptedPayload {
    /// The handle for the first (and for our workflows, only) value.
    pub fn first_handle(&self) -> Result<EncryptedHandle, RelayerError> {
        self.handles.first().copied().ok_or_else(|| {
            RelayerError::InvalidResponse("encrypted input returned no handles".to_string())
        })
    }
}

/// Ephemeral key pair for a user decryption request.
#[derive(Clone, PartialEq, Eq)]
pub struct DecryptKeypair {
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for DecryptKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptKeypair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// A handle together with the contract it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleContractPair {
    pub handle: EncryptedHandle,
    pub contract_address: Address,
}

/// Everything the relayer needs to check and serve a user decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDecryptRequest {
    pub pairs: Vec<HandleContractPair>,
    pub keypair: DecryptKeypair,
    /// Wallet signature over the EIP-712 payload, hex without `0x`.
    pub signature: String,
    pub contract_addresses: Vec<Address>,
    pub user_address: Address,
    pub start_timestamp: u64,
    pub duration_days: u64,
}

/// Confidential-computing SDK operations used by the workflows.
#[async_trait]
pub trait EncryptionService: Send + Sync {
    /// Encrypt the queued values for `(input.contract(), input.user())`.
    async fn encrypt(&self, input: EncryptedInput) -> Result<EncryptedPayload, RelayerError>;

    async fn generate_keypair(&self) -> Result<DecryptKeypair, RelayerError>;

    /// Build the typed-data authorization the wallet has to sign.
    fn create_eip712(
        &self,
        public_key: &str,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<Eip712Payload, RelayerError>;

    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<DecryptedValues, RelayerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RelayerError {
    #[error("Encryption service configuration invalid: {0}")]
    Config(String),

    #[error("Encryption service request failed: {0}")]
    Request(String),

    #[error("Encryption service response was invalid: {0}")]
    InvalidResponse(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, B256};

    #[test]
    fn encrypted_input_keeps_scope_and_values() {
        let contract = address!("0x1000000000000000000000000000000000000001");
        let user = address!("0x3000000000000000000000000000000000000003");
        let input = EncryptedInput::new(contract, user).add64(5).add64(7);

        assert_eq!(input.contract(), contract);
        assert_eq!(input.user(), user);
        assert_eq!(input.values(), &[PlainValue::U64(5), PlainValue::U64(7)]);
    }

    #[test]
    fn empty_payload_has_no_first_handle() {
        let payload = EncryptedPayload {
            handles: vec![],
            input_proof: Bytes::new(),
        };
        assert!(matches!(
            payload.first_handle(),
            Err(RelayerError::InvalidResponse(_))
        ));

        let handle = EncryptedHandle(B256::repeat_byte(1));
        let payload = EncryptedPayload {
            handles: vec![handle],
            input_proof: Bytes::new(),
        };
        assert_eq!(payload.first_handle().unwrap(), handle);
    }

    #[test]
    fn keypair_debug_hides_private_key() {
        let keypair = DecryptKeypair {
            public_key: "pub".into(),
            private_key: "secret".into(),
        };
        let rendered = format!("{keypair:?}");
        assert!(rendered.contains("pub"));
        assert!(!rendered.contains("secret"));
    }
}
