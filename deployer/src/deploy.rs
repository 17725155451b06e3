// deployer/src/deploy.rs

use ethers::{
    abi::Token,
    types::{Address, TxHash, U256},
    utils::to_checksum,
};
use std::{fmt, sync::Arc, time::Duration};
use tracing::{info, instrument};

use crate::artifact::ArtifactStore;
use crate::error::DeploymentError;
use crate::network::DeployNetwork;
use crate::signer::{DeployerSigner, SignerInfo};
use crate::transaction::{await_confirmation, ensure_success, prepare_creation_transaction, sign_and_send};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOptions {
    pub poll_interval: Duration,
    /// `None` waits for confirmation indefinitely.
    pub confirmation_timeout: Option<Duration>,
    pub gas_limit_buffer_percentage: u64,
}

impl Default for DeploymentOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            confirmation_timeout: None,
            gas_limit_buffer_percentage: 20,
        }
    }
}

/// One contract to create, and who pays for it.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    pub contract_name: String,
    pub constructor_args: Vec<Token>,
    pub signer: Arc<dyn DeployerSigner>,
}

impl DeploymentRequest {
    pub fn new(contract_name: impl Into<String>, signer: Arc<dyn DeployerSigner>) -> Self {
        Self { contract_name: contract_name.into(), constructor_args: Vec::new(), signer }
    }

    pub fn with_args(mut self, constructor_args: Vec<Token>) -> Self {
        self.constructor_args = constructor_args;
        self
    }
}

/// A contract whose creation transaction has been mined successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    pub contract_name: String,
    pub address: Address,
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

impl DeployedContract {
    pub fn checksummed_address(&self) -> String {
        to_checksum(&self.address, None)
    }
}

impl fmt::Display for DeployedContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} (tx {:?})", self.contract_name, self.checksummed_address(), self.transaction_hash)
    }
}

/// Runs creation transactions against one network.
#[derive(Debug)]
pub struct Deployer<N> {
    network: N,
    artifacts: ArtifactStore,
    options: DeploymentOptions,
}

impl<N: DeployNetwork> Deployer<N> {
    pub fn new(network: N, artifacts: ArtifactStore, options: DeploymentOptions) -> Self {
        Self { network, artifacts, options }
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Address and current balance of `signer`.
    pub async fn signer_info(&self, signer: &dyn DeployerSigner) -> Result<SignerInfo, DeploymentError> {
        let address = signer.address();
        let balance = self.network.balance(address).await?;
        Ok(SignerInfo { address, balance })
    }

    /// Creates one contract instance and waits for it to be mined.
    ///
    /// Artifact and constructor problems fail before any RPC call. No step
    /// is retried; each call broadcasts at most one transaction, so calling
    /// it twice always yields two distinct contracts.
    #[instrument(skip_all, fields(contract = %request.contract_name))]
    pub async fn deploy(&self, request: &DeploymentRequest) -> Result<DeployedContract, DeploymentError> {
        let artifact = self.artifacts.resolve(&request.contract_name)?;
        let creation_code = artifact.creation_code(&request.constructor_args)?;
        let signer = request.signer.as_ref();

        let tx = prepare_creation_transaction(
            &self.network,
            signer,
            creation_code,
            self.options.gas_limit_buffer_percentage,
        )
        .await?;
        let tx_hash = sign_and_send(&self.network, signer, &tx).await?;

        info!(?tx_hash, "Waiting for deployment to be mined...");
        let receipt =
            await_confirmation(&self.network, tx_hash, self.options.poll_interval, self.options.confirmation_timeout)
                .await?;
        ensure_success(&receipt)?;

        let address = receipt.contract_address.ok_or_else(|| {
            DeploymentError::Network(format!("receipt for {tx_hash:?} carries no contract address"))
        })?;

        let deployed = DeployedContract {
            contract_name: artifact.name,
            address,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
            gas_used: receipt.gas_used,
        };
        info!(address = %deployed.checksummed_address(), block = ?deployed.block_number, "✅ Contract deployed");
        Ok(deployed)
    }
}
