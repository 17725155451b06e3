// deployer/src/error.rs

use ethers::types::TxHash;
use std::time::Duration;
use thiserror::Error;

/// Everything that can stop a deployment. All of these are fatal to the
/// invocation and reach process control unchanged.
#[derive(Error, Debug)]
pub enum DeploymentError {
    /// The named contract has no usable compiled artifact.
    #[error("could not resolve artifact for `{name}`: {reason}")]
    ArtifactResolution { name: String, reason: String },

    /// Constructor arguments do not match the artifact's constructor.
    #[error("invalid constructor arguments for `{name}`: {reason}")]
    ConstructorArgs { name: String, reason: String },

    /// Signing was refused or the account cannot pay for the transaction.
    #[error("signer error: {0}")]
    Signer(String),

    /// RPC endpoint unreachable or returned an unexpected error.
    #[error("network error: {0}")]
    Network(String),

    /// The constructor reverted, either on-chain or during gas estimation.
    #[error("deployment reverted{}: {reason}", .tx_hash.map(|h| format!(" in {h:?}")).unwrap_or_default())]
    DeploymentRevert { tx_hash: Option<TxHash>, reason: String },

    /// No receipt was observed before the configured deadline.
    #[error("no confirmation for {tx_hash:?} after {}s", .waited.as_secs())]
    ConfirmationTimeout { tx_hash: TxHash, waited: Duration },
}

impl DeploymentError {
    /// Maps an RPC failure message onto the taxonomy. Nodes only report these
    /// conditions as free text, so the match is on well-known fragments.
    pub fn from_rpc(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("insufficient funds")
            || lower.contains("nonce too low")
            || lower.contains("replacement transaction underpriced")
            || lower.contains("invalid sender")
        {
            DeploymentError::Signer(message)
        } else if lower.contains("revert") {
            DeploymentError::DeploymentRevert { tx_hash: None, reason: message }
        } else {
            DeploymentError::Network(message)
        }
    }
}

/// Failure to record a deployed address. Always recovered.
#[derive(Error, Debug)]
pub enum ReportingError {
    #[error("address book I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("address book is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}
