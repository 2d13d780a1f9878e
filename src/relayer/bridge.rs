// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP adapter for the FHE SDK bridge.
//!
//! The bridge hosts the confidential-computing SDK and exposes its
//! operations as JSON endpoints:
//!
//! | Endpoint | Operation |
//! |----------|-----------|
//! | `GET /health` | readiness |
//! | `POST /v1/encrypt` | `createEncryptedInput(..).add64(..).encrypt()` |
//! | `POST /v1/keypair` | `generateKeypair()` |
//! | `POST /v1/user-decrypt` | `userDecrypt(..)` |
//!
//! EIP-712 payloads are built locally; they are plain data.

use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::{
    create_eip712, DecryptKeypair, DecryptedValues, DecryptionDomain, Eip712Payload,
    EncryptedInput, EncryptedPayload, EncryptionService, PlainValue, RelayerError,
    UserDecryptRequest,
};
use crate::blockchain::EncryptedHandle;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct FheBridgeClient {
    base_url: String,
    domain: DecryptionDomain,
    http: Client,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct EncryptBody {
    contract_address: String,
    user_address: String,
    values: Vec<WireValue>,
}

#[derive(Debug, Serialize, PartialEq)]
struct WireValue {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncryptResponse {
    handles: Vec<String>,
    input_proof: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeypairResponse {
    public_key: String,
    private_key: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct UserDecryptBody {
    handle_contract_pairs: Vec<WirePair>,
    private_key: String,
    public_key: String,
    signature: String,
    contract_addresses: Vec<String>,
    user_address: String,
    start_timestamp: String,
    duration_days: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct WirePair {
    handle: String,
    contract_address: String,
}

impl FheBridgeClient {
    pub fn new(base_url: &str, domain: DecryptionDomain) -> Result<Self, RelayerError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        url::Url::parse(&base_url)
            .map_err(|e| RelayerError::Config(format!("invalid bridge URL `{base_url}`: {e}")))?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RelayerError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            domain,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the bridge has finished loading the SDK.
    pub async fn is_ready(&self) -> bool {
        match self.http.get(format!("{}/health", self.base_url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "FHE bridge health check failed");
                false
            }
        }
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, RelayerError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| RelayerError::Request(format!("POST {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RelayerError::Request(format!(
                "POST {path} returned {status}: {text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RelayerError::InvalidResponse(format!("POST {path} invalid JSON: {e}")))
    }
}

#[async_trait]
impl EncryptionService for FheBridgeClient {
    async fn encrypt(&self, input: EncryptedInput) -> Result<EncryptedPayload, RelayerError> {
        let body = encrypt_body(&input);
        let response: EncryptResponse = self.post_json("/v1/encrypt", &body).await?;
        parse_encrypt_response(response)
    }

    async fn generate_keypair(&self) -> Result<DecryptKeypair, RelayerError> {
        let response: KeypairResponse = self
            .post_json("/v1/keypair", &serde_json::json!({}))
            .await?;
        Ok(DecryptKeypair {
            public_key: response.public_key,
            private_key: response.private_key,
        })
    }

    fn create_eip712(
        &self,
        public_key: &str,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<Eip712Payload, RelayerError> {
        create_eip712(
            &self.domain,
            public_key,
            contract_addresses,
            start_timestamp,
            duration_days,
        )
    }

    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<DecryptedValues, RelayerError> {
        let body = user_decrypt_body(request);
        let response: serde_json::Map<String, Value> =
            self.post_json("/v1/user-decrypt", &body).await?;
        parse_plaintexts(response)
    }
}

fn encrypt_body(input: &EncryptedInput) -> EncryptBody {
    EncryptBody {
        contract_address: input.contract().to_string(),
        user_address: input.user().to_string(),
        values: input
            .values()
            .iter()
            .map(|value| match value {
                PlainValue::U64(v) => WireValue {
                    kind: "u64",
                    value: v.to_string(),
                },
            })
            .collect(),
    }
}

fn user_decrypt_body(request: UserDecryptRequest) -> UserDecryptBody {
    UserDecryptBody {
        handle_contract_pairs: request
            .pairs
            .iter()
            .map(|pair| WirePair {
                handle: pair.handle.to_string(),
                contract_address: pair.contract_address.to_string(),
            })
            .collect(),
        private_key: request.keypair.private_key,
        public_key: request.keypair.public_key,
        signature: request.signature,
        contract_addresses: request
            .contract_addresses
            .iter()
            .map(ToString::to_string)
            .collect(),
        user_address: request.user_address.to_string(),
        start_timestamp: request.start_timestamp.to_string(),
        duration_days: request.duration_days.to_string(),
    }
}

fn parse_encrypt_response(response: EncryptResponse) -> Result<EncryptedPayload, RelayerError> {
    let handles = response
        .handles
        .iter()
        .map(|raw| raw.parse::<EncryptedHandle>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(RelayerError::InvalidResponse)?;

    let input_proof = alloy::hex::decode(response.input_proof.trim())
        .map_err(|e| RelayerError::InvalidResponse(format!("invalid input proof: {e}")))?;

    Ok(EncryptedPayload {
        handles,
        input_proof: Bytes::from(input_proof),
    })
}

/// Plaintexts are 64-bit integers rendered by the SDK as strings or
/// numbers; booleans are passed through as `true`/`false`.
fn parse_plaintexts(
    response: serde_json::Map<String, Value>,
) -> Result<DecryptedValues, RelayerError> {
    let mut values = DecryptedValues::with_capacity(response.len());
    for (raw_handle, raw_value) in response {
        let handle = raw_handle
            .parse::<EncryptedHandle>()
            .map_err(RelayerError::InvalidResponse)?;
        let value = match raw_value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(RelayerError::InvalidResponse(format!(
                    "unexpected plaintext for {handle}: {other}"
                )))
            }
        };
        values.insert(handle, value);
    }
    Ok(values)
}
