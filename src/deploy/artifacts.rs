// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Hardhat compilation artifacts.

use std::path::{Path, PathBuf};

use alloy::primitives::{keccak256, Bytes, B256};
use serde::Deserialize;
use serde_json::Value;

use super::DeployError;

/// The parts of a Hardhat artifact needed to deploy a contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: Value,
    /// Creation bytecode, without constructor arguments.
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: String,
    #[serde(default)]
    abi: Value,
    bytecode: String,
}

impl ContractArtifact {
    pub fn from_json(raw: &str) -> Result<Self, DeployError> {
        let raw: RawArtifact = serde_json::from_str(raw)
            .map_err(|e| DeployError::Artifact(format!("malformed artifact JSON: {e}")))?;

        let bytecode = alloy::hex::decode(raw.bytecode.trim()).map_err(|e| {
            DeployError::Artifact(format!("{}: invalid bytecode: {e}", raw.contract_name))
        })?;
        if bytecode.is_empty() {
            return Err(DeployError::Artifact(format!(
                "{}: artifact has no creation bytecode (abstract contract or interface?)",
                raw.contract_name
            )));
        }

        Ok(Self {
            contract_name: raw.contract_name,
            abi: raw.abi,
            bytecode: Bytes::from(bytecode),
        })
    }

    /// Find and parse the artifact for `name` under `dir`.
    ///
    /// Accepts both a flat `<dir>/<name>.json` and Hardhat's
    /// `<dir>/contracts/<name>.sol/<name>.json` layout.
    pub fn load(dir: &Path, name: &str) -> Result<Self, DeployError> {
        let path = candidate_paths(dir, name)
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| {
                DeployError::Artifact(format!("no artifact for {name} under {}", dir.display()))
            })?;

        let raw = std::fs::read_to_string(&path).map_err(|source| DeployError::Io {
            path: path.clone(),
            source,
        })?;
        let artifact = Self::from_json(&raw)?;
        if artifact.contract_name != name {
            return Err(DeployError::Artifact(format!(
                "{} holds {}, expected {name}",
                path.display(),
                artifact.contract_name
            )));
        }
        Ok(artifact)
    }

    /// Identifies the deployed code together with its constructor arguments.
    pub fn deployment_hash(&self, constructor_args: &[u8]) -> B256 {
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(constructor_args);
        keccak256(code)
    }
}

fn candidate_paths(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![
        dir.join(format!("{name}.json")),
        dir.join("contracts")
            .join(format!("{name}.sol"))
            .join(format!("{name}.json")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artifact_json(name: &str, bytecode: &str) -> String {
        json!({
            "_format": "hh-sol-artifact-1",
            "contractName": name,
            "sourceName": format!("contracts/{name}.sol"),
            "abi": [],
            "bytecode": bytecode,
            "deployedBytecode": "0x",
        })
        .to_string()
    }

    #[test]
    fn parses_hardhat_artifact() {
        let artifact =
            ContractArtifact::from_json(&artifact_json("ConfidentialMETH", "0x6080")).unwrap();
        assert_eq!(artifact.contract_name, "ConfidentialMETH");
        assert_eq!(artifact.bytecode, Bytes::from_static(&[0x60, 0x80]));
    }

    #[test]
    fn rejects_empty_bytecode() {
        let err = ContractArtifact::from_json(&artifact_json("IERC7984", "0x")).unwrap_err();
        assert!(matches!(err, DeployError::Artifact(_)));
    }

    #[test]
    fn loads_from_hardhat_layout() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("contracts").join("ConfidentialMZama.sol");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            nested.join("ConfidentialMZama.json"),
            artifact_json("ConfidentialMZama", "0x60806040"),
        )
        .unwrap();

        let artifact = ContractArtifact::load(dir.path(), "ConfidentialMZama").unwrap();
        assert_eq!(artifact.bytecode.len(), 4);

        assert!(ContractArtifact::load(dir.path(), "ConfidentialStaking").is_err());
    }

    #[test]
    fn deployment_hash_covers_constructor_args() {
        let artifact =
            ContractArtifact::from_json(&artifact_json("ConfidentialStaking", "0x6080")).unwrap();
        assert_ne!(
            artifact.deployment_hash(&[0x01]),
            artifact.deployment_hash(&[0x02])
        );
    }
}
