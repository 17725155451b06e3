// deployer/src/cli.rs
// Pieces shared by the `deploy_token` and `deploy_stable_swap` binaries.

use clap::Parser;
use ethers::{
    providers::{Http, Provider},
    signers::{LocalWallet, Signer},
};
use eyre::{Result, WrapErr};
use std::{ffi::OsString, io::Write, path::PathBuf, sync::Arc};
use tracing_subscriber::{fmt, EnvFilter};

use crate::artifact::ArtifactStore;
use crate::config::Config;
use crate::deploy::Deployer;
use crate::network::{connect_http, DeployNetwork};
use crate::process::{finish, RunStatus};
use crate::signer::DeployerSigner;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, long_about = None)]
pub struct DeployArgs {
    /// JSON-RPC endpoint. Overrides RPC_URL.
    #[arg(long = "rpc-url", value_name = "URL")]
    pub rpc_url: Option<String>,

    /// Root of the compiled artifacts tree. Overrides ARTIFACTS_DIR.
    #[arg(long = "artifacts-dir", value_name = "DIR")]
    pub artifacts_dir: Option<PathBuf>,

    /// JSON file deployed addresses are recorded in. Overrides ADDRESS_BOOK_PATH.
    #[arg(long = "address-book", value_name = "FILE")]
    pub address_book: Option<PathBuf>,

    /// Give up waiting for the creation receipt after this many seconds.
    #[arg(long = "confirmation-timeout-secs", value_name = "SECS")]
    pub confirmation_timeout_secs: Option<u64>,

    /// Constructor argument, in declaration order. Repeat per argument.
    #[arg(long = "arg", value_name = "VALUE")]
    pub constructor_args: Vec<String>,
}

impl DeployArgs {
    /// Command-line flags win over the environment.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(dir) = &self.artifacts_dir {
            config.artifacts_dir = dir.clone();
        }
        if let Some(path) = &self.address_book {
            config.address_book_path = path.clone();
        }
        if let Some(secs) = self.confirmation_timeout_secs {
            config.confirmation_timeout_secs = Some(secs);
        }
        config
    }
}

/// Parses `args` without letting clap end the process. `--help` and
/// `--version` print and settle as success; a usage error goes through
/// [`finish`] like any other failure.
pub fn parse_cli<C, I, T, W>(args: I, err_out: &mut W) -> std::result::Result<C, RunStatus>
where
    C: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    match C::try_parse_from(args) {
        Ok(cli) => Ok(cli),
        Err(e) if e.exit_code() == 0 => {
            let _ = e.print();
            Err(RunStatus::Success)
        }
        Err(e) => {
            let rendered = e.to_string();
            let message = rendered.trim_start_matches("error: ").trim_end();
            Err(finish(Err::<(), _>(eyre::eyre!("invalid command line: {message}")), err_out))
        }
    }
}

/// Logs go to stderr so stdout only carries operator lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).try_init();
}

/// Connects to the configured node and loads the deployer key, bound to the
/// node's chain id.
pub async fn connect(config: &Config) -> Result<(Deployer<Provider<Http>>, Arc<dyn DeployerSigner>)> {
    let options = config.deployment_options();
    let provider = connect_http(&config.rpc_url, options.poll_interval)?;
    let chain_id = DeployNetwork::chain_id(&provider)
        .await
        .wrap_err_with(|| format!("RPC at {} is not reachable", config.rpc_url))?;
    tracing::info!(chain_id, "RPC OK");

    let wallet = config
        .deployer_private_key
        .parse::<LocalWallet>()
        .wrap_err("DEPLOYER_PRIVATE_KEY is not a valid private key")?
        .with_chain_id(chain_id);

    let deployer = Deployer::new(provider, ArtifactStore::new(&config.artifacts_dir), options);
    let signer: Arc<dyn DeployerSigner> = Arc::new(wallet);
    Ok((deployer, signer))
}
