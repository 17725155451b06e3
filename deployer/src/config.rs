// deployer/src/config.rs

use dotenv::dotenv;
use eyre::{Result, WrapErr};
use std::{env, fmt, path::PathBuf, time::Duration};
use tracing::info;

use crate::deploy::DeploymentOptions;

const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
const DEFAULT_ADDRESS_BOOK_PATH: &str = "deployments/addresses.json";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
const DEFAULT_GAS_LIMIT_BUFFER_PERCENTAGE: u64 = 20;

#[derive(Clone)]
pub struct Config {
    // Network & Keys
    pub rpc_url: String,
    pub deployer_private_key: String,

    // Artifacts & Records
    pub artifacts_dir: PathBuf,
    pub address_book_path: PathBuf,

    // Confirmation & Gas
    pub poll_interval_ms: u64,
    pub confirmation_timeout_secs: Option<u64>,
    pub gas_limit_buffer_percentage: u64,
}

impl Config {
    pub fn deployment_options(&self) -> DeploymentOptions {
        DeploymentOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            confirmation_timeout: self.confirmation_timeout_secs.map(Duration::from_secs),
            gas_limit_buffer_percentage: self.gas_limit_buffer_percentage,
        }
    }
}

// Keeps key material out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rpc_url", &self.rpc_url)
            .field("deployer_private_key", &"<redacted>")
            .field("artifacts_dir", &self.artifacts_dir)
            .field("address_book_path", &self.address_book_path)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("confirmation_timeout_secs", &self.confirmation_timeout_secs)
            .field("gas_limit_buffer_percentage", &self.gas_limit_buffer_percentage)
            .finish()
    }
}

pub fn load_config() -> Result<Config> {
    dotenv().ok();
    let config = config_from_lookup(|name| env::var(name).ok())?;
    info!(?config, "Configuration loaded");
    Ok(config)
}

/// Builds a [`Config`] from any variable source; `load_config` feeds it the
/// process environment.
pub fn config_from_lookup<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let parse_u64 = |name: &str| -> Result<Option<u64>> {
        non_empty(name)
            .map(|v| v.trim().parse::<u64>().wrap_err_with(|| format!("{name} must be an unsigned integer")))
            .transpose()
    };

    // --- Load vars ---
    let rpc_url = non_empty("RPC_URL").ok_or_else(|| eyre::eyre!("RPC_URL must be set"))?;
    let deployer_private_key = non_empty("DEPLOYER_PRIVATE_KEY")
        .ok_or_else(|| eyre::eyre!("DEPLOYER_PRIVATE_KEY must be set"))?;
    let artifacts_dir = non_empty("ARTIFACTS_DIR").unwrap_or_else(|| DEFAULT_ARTIFACTS_DIR.to_string());
    let address_book_path =
        non_empty("ADDRESS_BOOK_PATH").unwrap_or_else(|| DEFAULT_ADDRESS_BOOK_PATH.to_string());
    let poll_interval_ms = parse_u64("POLL_INTERVAL_MS")?.unwrap_or(DEFAULT_POLL_INTERVAL_MS);
    let confirmation_timeout_secs = parse_u64("CONFIRMATION_TIMEOUT_SECS")?;
    let gas_limit_buffer_percentage =
        parse_u64("GAS_LIMIT_BUFFER_PERCENTAGE")?.unwrap_or(DEFAULT_GAS_LIMIT_BUFFER_PERCENTAGE);

    Ok(Config {
        rpc_url,
        deployer_private_key,
        artifacts_dir: PathBuf::from(artifacts_dir),
        address_book_path: PathBuf::from(address_book_path),
        poll_interval_ms,
        confirmation_timeout_secs,
        gas_limit_buffer_percentage,
    })
}
