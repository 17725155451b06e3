// deployer/src/utils.rs

use ethers::types::U256;
use ethers::utils::format_units as ethers_format_units; // Alias to avoid clashing with the local helper
use eyre::Result;

pub fn format_units(value: U256, decimals: u32) -> Result<String> {
    ethers_format_units(value, decimals).map_err(|e| eyre::eyre!("Failed to format units: {}", e))
}

/// Wei rendered as ether without trailing zeros, e.g. `1.5`.
pub fn format_ether(wei: U256) -> String {
    // 18 decimals always fits, format_units only fails above 77
    let full = format_units(wei, 18).unwrap_or_else(|_| wei.to_string());
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => full,
    }
}
