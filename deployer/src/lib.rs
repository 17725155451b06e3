// deployer/src/lib.rs
//! Contract-creation orchestration for EVM networks: resolve a compiled
//! artifact, submit its creation transaction, wait for the receipt, and
//! report the resulting address.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod error;
pub mod flows;
pub mod gas;
pub mod network;
pub mod process;
pub mod report;
pub mod signer;
pub mod transaction;
pub mod utils;

// Public types re-exported for the binaries and integration tests
pub use artifact::{ArtifactStore, ContractArtifact};
pub use deploy::{DeployedContract, Deployer, DeploymentOptions, DeploymentRequest};
pub use error::{DeploymentError, ReportingError};
pub use network::DeployNetwork;
pub use process::{finish, RunStatus};
pub use report::{AddressBookReporter, DeploymentReporter, LogReporter, ReportingOutcome};
pub use signer::{DeployerSigner, SignerInfo};
