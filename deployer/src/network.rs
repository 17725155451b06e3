// deployer/src/network.rs

use async_trait::async_trait;
use ethers::{
    providers::{Http, JsonRpcClient, Middleware, Provider},
    types::{
        transaction::eip2718::TypedTransaction, Address, BlockNumber, Bytes, TransactionReceipt, TxHash, U256,
    },
};
use std::{fmt, time::Duration};
use tracing::{debug, instrument};

use crate::error::DeploymentError;

/// The JSON-RPC surface a deployment needs. Every call is one round trip and
/// none of them is retried here.
#[async_trait]
pub trait DeployNetwork: Send + Sync + fmt::Debug {
    async fn chain_id(&self) -> Result<u64, DeploymentError>;

    async fn balance(&self, account: Address) -> Result<U256, DeploymentError>;

    /// Whether the latest block carries a base fee. Chains without one only
    /// accept legacy `gasPrice` transactions.
    async fn supports_eip1559(&self) -> Result<bool, DeploymentError>;

    /// Fills nonce, gas limit and fee fields of an unsigned transaction.
    async fn fill_transaction(&self, tx: &mut TypedTransaction) -> Result<(), DeploymentError>;

    /// Broadcasts an RLP-encoded signed transaction and returns its hash once
    /// the node has accepted it into the pool.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, DeploymentError>;

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TransactionReceipt>, DeploymentError>;
}

#[async_trait]
impl<P> DeployNetwork for Provider<P>
where
    P: JsonRpcClient + 'static,
{
    async fn chain_id(&self) -> Result<u64, DeploymentError> {
        let id = self.get_chainid().await.map_err(rpc_error)?;
        Ok(id.as_u64())
    }

    async fn balance(&self, account: Address) -> Result<U256, DeploymentError> {
        self.get_balance(account, None).await.map_err(rpc_error)
    }

    async fn supports_eip1559(&self) -> Result<bool, DeploymentError> {
        let latest = self.get_block(BlockNumber::Latest).await.map_err(rpc_error)?;
        Ok(latest.is_some_and(|block| block.base_fee_per_gas.is_some()))
    }

    #[instrument(skip_all, level = "debug")]
    async fn fill_transaction(&self, tx: &mut TypedTransaction) -> Result<(), DeploymentError> {
        // The bare provider leaves the nonce to signing middleware, so take
        // the pending count ourselves.
        if tx.nonce().is_none() {
            if let Some(from) = tx.from().copied() {
                let nonce = self
                    .get_transaction_count(from, Some(BlockNumber::Pending.into()))
                    .await
                    .map_err(rpc_error)?;
                tx.set_nonce(nonce);
            }
        }
        Middleware::fill_transaction(self, tx, None).await.map_err(rpc_error)?;
        debug!(gas = ?tx.gas(), fee = ?tx.gas_price(), nonce = ?tx.nonce(), "Transaction filled");
        Ok(())
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, DeploymentError> {
        let pending = Middleware::send_raw_transaction(self, raw).await.map_err(rpc_error)?;
        Ok(pending.tx_hash())
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TransactionReceipt>, DeploymentError> {
        self.get_transaction_receipt(tx_hash).await.map_err(rpc_error)
    }
}

fn rpc_error(e: impl fmt::Display) -> DeploymentError {
    DeploymentError::from_rpc(e.to_string())
}

/// HTTP provider for `rpc_url`, polling at `interval` like the rest of the
/// tool.
pub fn connect_http(rpc_url: &str, interval: Duration) -> Result<Provider<Http>, DeploymentError> {
    let provider = Provider::<Http>::try_from(rpc_url)
        .map_err(|e| DeploymentError::Network(format!("invalid RPC URL {rpc_url}: {e}")))?;
    Ok(provider.interval(interval))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::MockProvider;
    use ethers::types::{Block, TransactionRequest};

    #[tokio::test]
    async fn provider_errors_are_classified() {
        let (provider, mock) = Provider::mocked();
        mock.push_response(ethers::providers::MockResponse::Error(
            ethers::providers::JsonRpcError {
                code: -32000,
                message: "insufficient funds for gas * price + value".to_string(),
                data: None,
            },
        ));
        let err = DeployNetwork::balance(&provider, Address::zero()).await.unwrap_err();
        assert!(matches!(err, DeploymentError::Signer(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn receipt_lookup_passes_through_missing_receipt() {
        let (provider, mock): (Provider<MockProvider>, _) = Provider::mocked();
        mock.push::<Option<TransactionReceipt>, _>(None).unwrap();
        let receipt = DeployNetwork::transaction_receipt(&provider, TxHash::zero()).await.unwrap();
        assert!(receipt.is_none());
    }

    #[tokio::test]
    async fn latest_block_base_fee_selects_transaction_type() {
        let (provider, mock) = Provider::mocked();
        mock.push(Block::<TxHash> { number: Some(7u64.into()), ..Default::default() }).unwrap();
        assert!(!provider.supports_eip1559().await.unwrap());

        mock.push(Block::<TxHash> {
            number: Some(8u64.into()),
            base_fee_per_gas: Some(U256::from(7u64)),
            ..Default::default()
        })
        .unwrap();
        assert!(provider.supports_eip1559().await.unwrap());
    }

    #[tokio::test]
    async fn legacy_transaction_is_filled_with_gas_price() {
        let (provider, mock) = Provider::mocked();
        let mut tx: TypedTransaction = TransactionRequest::new()
            .from(Address::repeat_byte(0x01))
            .data(Bytes::from(vec![0x60, 0x00]))
            .into();
        // Answered last-in first-out: nonce, gas price, gas estimate.
        mock.push(U256::from(53_000u64)).unwrap();
        mock.push(U256::from(5u64)).unwrap();
        mock.push(U256::from(3u64)).unwrap();

        DeployNetwork::fill_transaction(&provider, &mut tx).await.unwrap();

        assert!(matches!(tx, TypedTransaction::Legacy(_)));
        assert_eq!(tx.nonce(), Some(&U256::from(3u64)));
        assert_eq!(tx.gas_price(), Some(U256::from(5u64)));
        assert_eq!(tx.gas(), Some(&U256::from(53_000u64)));
    }

    #[test]
    fn invalid_url_is_a_network_error() {
        let err = connect_http("not a url", Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, DeploymentError::Network(_)));
    }
}
