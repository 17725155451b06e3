// deployer/src/report.rs
//! Best-effort recording of deployed addresses. A failure here never fails
//! the deployment: the address is printed with a manual-entry instruction
//! instead.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::deploy::DeployedContract;
use crate::error::ReportingError;

/// Somewhere a deployed address gets recorded.
pub trait DeploymentReporter {
    fn record(&self, deployed: &DeployedContract) -> Result<(), ReportingError>;
}

/// What happened to the address after a successful deployment.
#[derive(Debug)]
pub enum ReportingOutcome {
    Recorded,
    Fallback(ReportingError),
}

impl ReportingOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, ReportingOutcome::Recorded)
    }
}

/// One address book entry, keyed by contract name in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBookEntry {
    pub address: String,
    pub transaction_hash: String,
    pub block_number: Option<u64>,
    pub deployed_at: String,
}

impl From<&DeployedContract> for AddressBookEntry {
    fn from(deployed: &DeployedContract) -> Self {
        Self {
            address: deployed.checksummed_address(),
            transaction_hash: format!("{:?}", deployed.transaction_hash),
            block_number: deployed.block_number,
            deployed_at: Utc::now().to_rfc3339(),
        }
    }
}

/// JSON file mapping contract names to their latest deployment. Entries for
/// other contracts are kept; the entry for the same name is replaced.
#[derive(Debug, Clone)]
pub struct AddressBookReporter {
    path: PathBuf,
}

impl AddressBookReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, ReportingError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Map::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl DeploymentReporter for AddressBookReporter {
    fn record(&self, deployed: &DeployedContract) -> Result<(), ReportingError> {
        let mut book = self.load()?;
        book.insert(
            deployed.contract_name.clone(),
            serde_json::to_value(AddressBookEntry::from(deployed))?,
        );

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let rendered = serde_json::to_string_pretty(&book)?;
        fs::write(&self.path, rendered + "\n")?;
        info!(path = %self.path.display(), contract = %deployed.contract_name, "Address book updated");
        Ok(())
    }
}

/// Records nothing; the deployed line printed by the caller is the record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl DeploymentReporter for LogReporter {
    fn record(&self, deployed: &DeployedContract) -> Result<(), ReportingError> {
        info!(contract = %deployed.contract_name, address = %deployed.checksummed_address(), "Deployment recorded in log only");
        Ok(())
    }
}

/// Hands `deployed` to `reporter`. On failure the address goes to `out` as a
/// manual-entry instruction; `label` names it there (`exchange`, `token`).
/// Never returns an error.
pub fn report_deployment<R, W>(reporter: &R, deployed: &DeployedContract, label: &str, out: &mut W) -> ReportingOutcome
where
    R: DeploymentReporter + ?Sized,
    W: Write,
{
    match reporter.record(deployed) {
        Ok(()) => ReportingOutcome::Recorded,
        Err(error) => {
            warn!(%error, contract = %deployed.contract_name, "Recording deployed address failed, falling back to manual entry");
            // Operator output is the last resort; nothing left to fall back to.
            let _ = writeln!(out, "Failed to write to file");
            let _ = writeln!(out, "Manually input {label} address: {}", deployed.checksummed_address());
            ReportingOutcome::Fallback(error)
        }
    }
}
