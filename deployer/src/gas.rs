// deployer/src/gas.rs
// Gas limit padding and upfront cost for creation transactions.

use ethers::types::{transaction::eip2718::TypedTransaction, U256};

/// Pads an estimated gas limit by `buffer_percentage` percent. Constructor
/// gas estimates are tight and state can move between estimate and mining.
pub fn buffered_gas_limit(estimated: U256, buffer_percentage: u64) -> U256 {
    let multiplier = U256::from(100u64.saturating_add(buffer_percentage));
    estimated
        .saturating_mul(multiplier)
        .checked_div(U256::from(100u64))
        .unwrap_or(estimated)
}

/// Worst-case wei the sender must hold: `gas * max fee + value`.
/// `None` while the transaction still lacks a gas limit or a fee.
pub fn max_upfront_cost(tx: &TypedTransaction) -> Option<U256> {
    let gas = *tx.gas()?;
    let fee = tx.gas_price()?;
    let value = tx.value().copied().unwrap_or_default();
    Some(gas.saturating_mul(fee).saturating_add(value))
}
