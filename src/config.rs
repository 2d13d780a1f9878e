// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup. Invalid values
//! fail startup instead of silently falling back to a default.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `NETWORK` | Target network, must be `sepolia` | `sepolia` |
//! | `RPC_URL` | Sepolia JSON-RPC endpoint | public Sepolia endpoint |
//! | `METH_ADDRESS` | ConfidentialMETH token contract | zero (unconfigured) |
//! | `MZAMA_ADDRESS` | ConfidentialMZama token contract | zero (unconfigured) |
//! | `STAKING_ADDRESS` | ConfidentialStaking contract | zero (unconfigured) |
//! | `WALLETCONNECT_PROJECT_ID` | Wallet-connect project id exposed to clients | `YOUR_PROJECT_ID` |
//! | `WALLET_PRIVATE_KEY_PEM` | Session wallet key, PKCS#8 PEM | Optional |
//! | `WALLET_PRIVATE_KEY_PATH` | File holding the PEM key | Optional |
//! | `WALLET_PRIVATE_KEY_HEX` | Session wallet key, hex | Optional |
//! | `FHE_BRIDGE_URL` | Encryption service bridge base URL | Optional (never ready) |
//! | `FHE_GATEWAY_CHAIN_ID` | Decryption domain chain id | `55815` |
//! | `FHE_DECRYPTION_CONTRACT` | Decryption domain verifying contract | Sepolia gateway |
//! | `DECRYPT_MISSING_HANDLE` | `zero` or `error` | `zero` |
//! | `BALANCE_POLL_SECS` | Balance refresh interval, `0` disables | `12` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::{
    ensure_sepolia_network, parse_address, signing, ChainClientError, SEPOLIA,
};
use crate::orchestrator::MissingHandlePolicy;
use crate::relayer::DecryptionDomain;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const NETWORK_ENV: &str = "NETWORK";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const METH_ADDRESS_ENV: &str = "METH_ADDRESS";
pub const MZAMA_ADDRESS_ENV: &str = "MZAMA_ADDRESS";
pub const STAKING_ADDRESS_ENV: &str = "STAKING_ADDRESS";
pub const WALLETCONNECT_PROJECT_ID_ENV: &str = "WALLETCONNECT_PROJECT_ID";
pub const WALLET_PRIVATE_KEY_PEM_ENV: &str = "WALLET_PRIVATE_KEY_PEM";
pub const WALLET_PRIVATE_KEY_PATH_ENV: &str = "WALLET_PRIVATE_KEY_PATH";
pub const WALLET_PRIVATE_KEY_HEX_ENV: &str = "WALLET_PRIVATE_KEY_HEX";
pub const FHE_BRIDGE_URL_ENV: &str = "FHE_BRIDGE_URL";
pub const FHE_GATEWAY_CHAIN_ID_ENV: &str = "FHE_GATEWAY_CHAIN_ID";
pub const FHE_DECRYPTION_CONTRACT_ENV: &str = "FHE_DECRYPTION_CONTRACT";
pub const DECRYPT_MISSING_HANDLE_ENV: &str = "DECRYPT_MISSING_HANDLE";
pub const BALANCE_POLL_SECS_ENV: &str = "BALANCE_POLL_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Placeholder project id shipped with the app.
pub const DEFAULT_WALLETCONNECT_PROJECT_ID: &str = "YOUR_PROJECT_ID";

const DEFAULT_BALANCE_POLL_SECS: u64 = 12;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },

    #[error("Failed to read {}: {source}", path.display())]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Key(#[from] ChainClientError),
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Where the session wallet key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum WalletKeySource {
    Pem(String),
    PemFile(PathBuf),
    Hex(String),
}

impl std::fmt::Debug for WalletKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletKeySource::Pem(_) => f.write_str("Pem(<redacted>)"),
            WalletKeySource::PemFile(path) => f.debug_tuple("PemFile").field(path).finish(),
            WalletKeySource::Hex(_) => f.write_str("Hex(<redacted>)"),
        }
    }
}

impl WalletKeySource {
    /// Load the signer. Reads the key file for [`WalletKeySource::PemFile`].
    pub fn load(&self) -> Result<PrivateKeySigner, ConfigError> {
        let signer = match self {
            WalletKeySource::Pem(pem) => signing::signer_from_pem(pem.as_bytes())?,
            WalletKeySource::PemFile(path) => {
                let pem = std::fs::read(path).map_err(|source| ConfigError::ReadKey {
                    path: path.clone(),
                    source,
                })?;
                signing::signer_from_pem(&pem)?
            }
            WalletKeySource::Hex(hex) => signing::signer_from_hex(hex)?,
        };
        Ok(signer)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rpc_url: String,
    pub meth_address: Address,
    pub mzama_address: Address,
    pub staking_address: Address,
    pub walletconnect_project_id: String,
    pub wallet_key: Option<WalletKeySource>,
    pub fhe_bridge_url: Option<String>,
    pub decryption_domain: DecryptionDomain,
    pub missing_handle_policy: MissingHandlePolicy,
    /// `None` disables the background balance poller.
    pub balance_poll_interval: Option<Duration>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        ensure_sepolia_network(get(NETWORK_ENV).as_deref())
            .map_err(|message| ConfigError::invalid(NETWORK_ENV, message))?;

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(PORT_ENV, format!("`{raw}`: {e}")))?,
            None => 8080,
        };

        let address = |var: &'static str| -> Result<Address, ConfigError> {
            parse_address(&get(var).unwrap_or_default())
                .map_err(|message| ConfigError::invalid(var, message))
        };

        let wallet_key = if let Some(pem) = get(WALLET_PRIVATE_KEY_PEM_ENV) {
            Some(WalletKeySource::Pem(pem))
        } else if let Some(path) = get(WALLET_PRIVATE_KEY_PATH_ENV) {
            Some(WalletKeySource::PemFile(PathBuf::from(path)))
        } else {
            get(WALLET_PRIVATE_KEY_HEX_ENV).map(WalletKeySource::Hex)
        };

        let mut decryption_domain = DecryptionDomain::sepolia();
        if let Some(raw) = get(FHE_GATEWAY_CHAIN_ID_ENV) {
            decryption_domain.chain_id = raw.trim().parse().map_err(|e| {
                ConfigError::invalid(FHE_GATEWAY_CHAIN_ID_ENV, format!("`{raw}`: {e}"))
            })?;
        }
        if get(FHE_DECRYPTION_CONTRACT_ENV).is_some() {
            decryption_domain.verifying_contract = address(FHE_DECRYPTION_CONTRACT_ENV)?;
        }

        let missing_handle_policy = match get(DECRYPT_MISSING_HANDLE_ENV) {
            Some(raw) => raw
                .parse()
                .map_err(|message| ConfigError::invalid(DECRYPT_MISSING_HANDLE_ENV, message))?,
            None => MissingHandlePolicy::default(),
        };

        let poll_secs = match get(BALANCE_POLL_SECS_ENV) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::invalid(BALANCE_POLL_SECS_ENV, format!("`{raw}`: {e}"))
            })?,
            None => DEFAULT_BALANCE_POLL_SECS,
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::invalid(
                    LOG_FORMAT_ENV,
                    format!("`{other}` (expected `json` or `pretty`)"),
                ))
            }
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            rpc_url: get(RPC_URL_ENV).unwrap_or_else(|| SEPOLIA.rpc_url.to_string()),
            meth_address: address(METH_ADDRESS_ENV)?,
            mzama_address: address(MZAMA_ADDRESS_ENV)?,
            staking_address: address(STAKING_ADDRESS_ENV)?,
            walletconnect_project_id: get(WALLETCONNECT_PROJECT_ID_ENV)
                .unwrap_or_else(|| DEFAULT_WALLETCONNECT_PROJECT_ID.to_string()),
            wallet_key,
            fhe_bridge_url: get(FHE_BRIDGE_URL_ENV),
            decryption_domain,
            missing_handle_policy,
            balance_poll_interval: (poll_secs > 0).then(|| Duration::from_secs(poll_secs)),
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
