// deployer/src/signer.rs

use async_trait::async_trait;
use ethers::{
    signers::{LocalWallet, Signer},
    types::{transaction::eip2718::TypedTransaction, Address, Signature, U256},
    utils::to_checksum,
};
use std::fmt;

use crate::error::DeploymentError;
use crate::utils::format_ether;

/// Identity that authorizes and pays for creation transactions.
///
/// Passed explicitly with every request so the orchestrator never reaches
/// for ambient key material.
#[async_trait]
pub trait DeployerSigner: Send + Sync + fmt::Debug {
    fn address(&self) -> Address;

    async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Signature, DeploymentError>;
}

#[async_trait]
impl DeployerSigner for LocalWallet {
    fn address(&self) -> Address {
        Signer::address(self)
    }

    async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Signature, DeploymentError> {
        Signer::sign_transaction(self, tx)
            .await
            .map_err(|e| DeploymentError::Signer(format!("local wallet refused to sign: {e}")))
    }
}

/// Address and balance of the deploying account, for operator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerInfo {
    pub address: Address,
    pub balance: U256,
}

impl fmt::Display for SignerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} ETH)",
            to_checksum(&self.address, None),
            format_ether(self.balance)
        )
    }
}
