// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Deployment Records
//!
//! On-disk layout, per network:
//!
//! ```text
//! <deployments>/<network>/
//! ├── .migrations.json     # script id -> unix timestamp of the run
//! ├── ConfidentialMETH.json
//! ├── ConfidentialMZama.json
//! └── ConfidentialStaking.json
//! ```
//!
//! Files are written to a temporary sibling and renamed into place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::DeployError;

const MIGRATIONS_FILE: &str = ".migrations.json";

/// One deployed contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub address: Address,
    pub transaction_hash: B256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Constructor arguments, as addresses.
    #[serde(default)]
    pub args: Vec<Address>,
    #[serde(default)]
    pub abi: Value,
    /// Hash of creation code plus encoded constructor arguments.
    pub deployment_hash: B256,
    pub deployed_at: DateTime<Utc>,
}

pub struct DeploymentStore {
    dir: PathBuf,
}

impl DeploymentStore {
    pub fn new(deployments_dir: &Path, network: &str) -> Self {
        Self {
            dir: deployments_dir.join(network),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn migrations(&self) -> Result<BTreeMap<String, i64>, DeployError> {
        Ok(self.read_json(MIGRATIONS_FILE)?.unwrap_or_default())
    }

    pub fn has_run(&self, id: &str) -> Result<bool, DeployError> {
        Ok(self.migrations()?.contains_key(id))
    }

    pub fn record_migration(&self, id: &str, at: DateTime<Utc>) -> Result<(), DeployError> {
        let mut migrations = self.migrations()?;
        migrations.insert(id.to_string(), at.timestamp());
        self.write_json(MIGRATIONS_FILE, &migrations)
    }

    pub fn load(&self, name: &str) -> Result<Option<DeploymentRecord>, DeployError> {
        self.read_json(&format!("{name}.json"))
    }

    pub fn save(&self, name: &str, record: &DeploymentRecord) -> Result<(), DeployError> {
        self.write_json(&format!("{name}.json"), record)
    }

    /// Forget every record and migration of this network.
    pub fn clear(&self) -> Result<(), DeployError> {
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir).map_err(|source| DeployError::Io {
                path: self.dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, DeployError> {
        let path = self.dir.join(file);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(DeployError::Io { path, source }),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| DeployError::Json { path, source })
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), DeployError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| DeployError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(file);
        let tmp = self.dir.join(format!("{file}.tmp"));
        let json = serde_json::to_string_pretty(value).map_err(|source| DeployError::Json {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&tmp, json).map_err(|source| DeployError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| DeployError::Io { path, source })
    }
}
