// deployer/src/transaction.rs

use ethers::types::{
    transaction::eip2718::TypedTransaction, Bytes, Eip1559TransactionRequest, TransactionReceipt,
    TransactionRequest, TxHash, U64,
};
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::error::DeploymentError;
use crate::gas::{buffered_gas_limit, max_upfront_cost};
use crate::network::DeployNetwork;
use crate::signer::DeployerSigner;
use crate::utils::format_ether;

const TX_SUCCESS_STATUS: U64 = U64([1]);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Builds a creation transaction (no `to`) for `creation_code`, filled and
/// padded, ready to sign. EIP-1559 where the chain has a base fee, legacy
/// `gasPrice` otherwise. Fails with `Signer` when the account cannot cover
/// the worst-case cost, before anything is broadcast.
#[instrument(skip_all, level = "debug", fields(from = ?signer.address()))]
pub async fn prepare_creation_transaction(
    network: &dyn DeployNetwork,
    signer: &dyn DeployerSigner,
    creation_code: Bytes,
    gas_limit_buffer_percentage: u64,
) -> Result<TypedTransaction, DeploymentError> {
    let from = signer.address();
    let chain_id = network.chain_id().await?;

    let mut tx: TypedTransaction = if network.supports_eip1559().await? {
        Eip1559TransactionRequest::new().from(from).data(creation_code).chain_id(chain_id).into()
    } else {
        debug!("Latest block has no base fee, using a legacy transaction");
        TransactionRequest::new().from(from).data(creation_code).chain_id(chain_id).into()
    };
    network.fill_transaction(&mut tx).await?;

    if let Some(estimated) = tx.gas().copied() {
        let padded = buffered_gas_limit(estimated, gas_limit_buffer_percentage);
        debug!(%estimated, %padded, "Gas limit padded");
        tx.set_gas(padded);
    }

    let required = max_upfront_cost(&tx)
        .ok_or_else(|| DeploymentError::Network("node did not fill gas limit and fee".into()))?;
    let balance = network.balance(from).await?;
    if balance < required {
        return Err(DeploymentError::Signer(format!(
            "insufficient funds: {from:?} holds {} ETH, deployment may cost up to {} ETH",
            format_ether(balance),
            format_ether(required)
        )));
    }

    Ok(tx)
}

/// Signs and broadcasts `tx`. Exactly one broadcast per call.
pub async fn sign_and_send(
    network: &dyn DeployNetwork,
    signer: &dyn DeployerSigner,
    tx: &TypedTransaction,
) -> Result<TxHash, DeploymentError> {
    let signature = signer.sign_transaction(tx).await?;
    let raw = tx.rlp_signed(&signature);
    let tx_hash = network.send_raw_transaction(raw).await?;
    info!(?tx_hash, "Creation transaction accepted by node");
    Ok(tx_hash)
}

/// Polls until `tx_hash` is mined. A receipt without a block number is still
/// pending. With `limit` unset this waits indefinitely. Intervals below 1ms
/// are raised to 1ms.
#[instrument(skip(network), level = "debug")]
pub async fn await_confirmation(
    network: &dyn DeployNetwork,
    tx_hash: TxHash,
    poll_interval: Duration,
    limit: Option<Duration>,
) -> Result<TransactionReceipt, DeploymentError> {
    let poll = async {
        let mut ticker = interval(poll_interval.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut polls: u64 = 0;
        loop {
            ticker.tick().await;
            polls += 1;
            match network.transaction_receipt(tx_hash).await? {
                Some(receipt) if receipt.block_number.is_some() => {
                    return Ok::<_, DeploymentError>(receipt);
                }
                _ => {
                    if polls % 30 == 0 {
                        warn!(?tx_hash, polls, "Still waiting for confirmation");
                    }
                }
            }
        }
    };

    match limit {
        Some(limit) => timeout(limit, poll)
            .await
            .map_err(|_| DeploymentError::ConfirmationTimeout { tx_hash, waited: limit })?,
        None => poll.await,
    }
}

/// Status 0 receipts become `DeploymentRevert`.
pub fn ensure_success(receipt: &TransactionReceipt) -> Result<(), DeploymentError> {
    match receipt.status {
        Some(status) if status != TX_SUCCESS_STATUS => Err(DeploymentError::DeploymentRevert {
            tx_hash: Some(receipt.transaction_hash),
            reason: format!("receipt status {status}"),
        }),
        _ => Ok(()),
    }
}
