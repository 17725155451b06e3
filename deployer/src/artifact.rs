// deployer/src/artifact.rs
//! Compiled contract artifacts, resolved by contract name from a Hardhat-style
//! `artifacts/` tree (`artifacts/contracts/<Source>.sol/<Name>.json`).

use ethers::{
    abi::{
        token::{LenientTokenizer, Tokenizer},
        Abi, Token,
    },
    types::Bytes,
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::error::DeploymentError;

/// Compiled bytecode plus interface for one contract.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

// Only the fields we need out of the Hardhat artifact JSON.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    abi: Abi,
    bytecode: String,
}

impl ContractArtifact {
    pub fn new(name: impl Into<String>, abi: Abi, bytecode: Bytes) -> Self {
        Self { name: name.into(), abi, bytecode }
    }

    /// Parses a Hardhat artifact document.
    pub fn from_json(name: &str, json: &str) -> Result<Self, DeploymentError> {
        let unresolved = |reason: String| DeploymentError::ArtifactResolution {
            name: name.to_string(),
            reason,
        };

        let raw: HardhatArtifact =
            serde_json::from_str(json).map_err(|e| unresolved(format!("malformed artifact: {e}")))?;
        if raw.contract_name != name {
            return Err(unresolved(format!("artifact declares contract `{}`", raw.contract_name)));
        }

        let cleaned = raw.bytecode.trim().trim_start_matches("0x");
        if cleaned.is_empty() {
            return Err(unresolved("artifact has no creation bytecode (abstract contract or interface?)".into()));
        }
        // Unlinked libraries leave `__$...$__` placeholders that are not hex.
        let bytecode = hex::decode(cleaned).map_err(|e| unresolved(format!("bytecode is not valid hex: {e}")))?;

        Ok(Self::new(raw.contract_name, raw.abi, Bytes::from(bytecode)))
    }

    /// Turns operator-supplied strings into ABI tokens for the constructor.
    pub fn parse_constructor_args(&self, raw: &[String]) -> Result<Vec<Token>, DeploymentError> {
        let inputs = self.abi.constructor().map(|c| c.inputs.as_slice()).unwrap_or_default();
        if inputs.len() != raw.len() {
            return Err(self.bad_args(format!(
                "constructor takes {} argument(s), {} given",
                inputs.len(),
                raw.len()
            )));
        }

        inputs
            .iter()
            .zip(raw)
            .map(|(param, value)| {
                LenientTokenizer::tokenize(&param.kind, value)
                    .map_err(|e| self.bad_args(format!("`{}` ({}): {e}", param.name, param.kind)))
            })
            .collect()
    }

    /// Bytecode with the ABI-encoded constructor arguments appended.
    pub fn creation_code(&self, args: &[Token]) -> Result<Bytes, DeploymentError> {
        match self.abi.constructor() {
            Some(constructor) => constructor
                .encode_input(self.bytecode.to_vec(), args)
                .map(Bytes::from)
                .map_err(|e| self.bad_args(e.to_string())),
            None if args.is_empty() => Ok(self.bytecode.clone()),
            None => Err(self.bad_args(format!("contract has no constructor but {} argument(s) given", args.len()))),
        }
    }

    fn bad_args(&self, reason: String) -> DeploymentError {
        DeploymentError::ConstructorArgs { name: self.name.clone(), reason }
    }
}

/// Looks artifacts up by contract name below a root directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, name: &str) -> Result<ContractArtifact, DeploymentError> {
        let path = self.locate(name)?;
        debug!(contract = name, path = %path.display(), "Resolved artifact");
        let json = fs::read_to_string(&path).map_err(|e| DeploymentError::ArtifactResolution {
            name: name.to_string(),
            reason: format!("failed to read {}: {e}", path.display()),
        })?;
        ContractArtifact::from_json(name, &json)
    }

    fn locate(&self, name: &str) -> Result<PathBuf, DeploymentError> {
        let file_name = format!("{name}.json");
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let entries = fs::read_dir(&dir).map_err(|e| DeploymentError::ArtifactResolution {
                name: name.to_string(),
                reason: format!("cannot read {}: {e}", dir.display()),
            })?;
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    // build-info holds solc inputs, never contract artifacts
                    if path.file_name().is_some_and(|n| n == "build-info") {
                        continue;
                    }
                    pending.push(path);
                } else if path.file_name().is_some_and(|n| n == file_name.as_str()) {
                    return Ok(path);
                }
            }
        }

        Err(DeploymentError::ArtifactResolution {
            name: name.to_string(),
            reason: format!("no {file_name} under {}", self.root.display()),
        })
    }
}
