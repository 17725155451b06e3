// deployer/src/flows.rs
//! The two operator flows: provisioning a `Token` and a `StableSwap`
//! exchange. Both write operator lines to `out` and leave exit codes to the
//! caller.

use ethers::utils::to_checksum;
use std::{io::Write, sync::Arc};
use tracing::info;

use crate::deploy::{DeployedContract, Deployer, DeploymentRequest};
use crate::error::DeploymentError;
use crate::network::DeployNetwork;
use crate::report::{report_deployment, DeploymentReporter, ReportingOutcome};
use crate::signer::DeployerSigner;

pub const TOKEN_CONTRACT: &str = "Token";
pub const STABLE_SWAP_CONTRACT: &str = "StableSwap";

/// Deploys `Token`, printing the deploying account and its balance first.
pub async fn deploy_token<N, R, W>(
    deployer: &Deployer<N>,
    signer: Arc<dyn DeployerSigner>,
    constructor_args: &[String],
    reporter: &R,
    out: &mut W,
) -> Result<(DeployedContract, ReportingOutcome), DeploymentError>
where
    N: DeployNetwork,
    R: DeploymentReporter + ?Sized,
    W: Write,
{
    let account = deployer.signer_info(signer.as_ref()).await?;
    info!(%account, "Deploying token");
    // Operator output; a closed stdout must not fail a deployment.
    let _ = writeln!(out, "Deploying contracts with the account: {}", to_checksum(&account.address, None));
    let _ = writeln!(out, "Account balance: {}", account.balance);

    let request = build_request(deployer, TOKEN_CONTRACT, signer, constructor_args)?;
    let deployed = deployer.deploy(&request).await?;
    let _ = writeln!(out, "tokenContract deployed at = {}", deployed.checksummed_address());

    let outcome = report_deployment(reporter, &deployed, "token", out);
    Ok((deployed, outcome))
}

/// Deploys `StableSwap` and records the exchange address.
pub async fn deploy_stable_swap<N, R, W>(
    deployer: &Deployer<N>,
    signer: Arc<dyn DeployerSigner>,
    constructor_args: &[String],
    reporter: &R,
    out: &mut W,
) -> Result<(DeployedContract, ReportingOutcome), DeploymentError>
where
    N: DeployNetwork,
    R: DeploymentReporter + ?Sized,
    W: Write,
{
    let request = build_request(deployer, STABLE_SWAP_CONTRACT, signer, constructor_args)?;
    let deployed = deployer.deploy(&request).await?;

    let outcome = report_deployment(reporter, &deployed, "exchange", out);
    if outcome.is_recorded() {
        let _ = writeln!(out, "Successfully wrote exchange address {}", deployed.checksummed_address());
    }
    Ok((deployed, outcome))
}

fn build_request<N: DeployNetwork>(
    deployer: &Deployer<N>,
    contract_name: &str,
    signer: Arc<dyn DeployerSigner>,
    constructor_args: &[String],
) -> Result<DeploymentRequest, DeploymentError> {
    // Nothing to tokenize, so skip the artifact read; `deploy` resolves it anyway.
    let tokens = if constructor_args.is_empty() {
        Vec::new()
    } else {
        deployer.artifacts().resolve(contract_name)?.parse_constructor_args(constructor_args)?
    };
    Ok(DeploymentRequest::new(contract_name, signer).with_args(tokens))
}
