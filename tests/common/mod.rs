// tests/common/mod.rs
// Fakes for the network and signer seams plus artifact fixtures.
#![allow(dead_code)]

use async_trait::async_trait;
use contract_deployer::{
    ArtifactStore, DeployNetwork, DeployedContract, Deployer, DeployerSigner, DeploymentError,
    DeploymentOptions, DeploymentReporter, ReportingError,
};
use ethers::{
    signers::LocalWallet,
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, Signature, TransactionReceipt, TxHash, H256,
        U256, U64,
    },
    utils::{get_contract_address, keccak256},
};
use std::{
    collections::HashMap,
    fs, io,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tempdir::TempDir;
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

// First default Anvil/Hardhat account.
pub const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const CHAIN_ID: u64 = 31337;
pub const GAS_ESTIMATE: u64 = 100_000;
pub const MAX_FEE_WEI: u64 = 1_000_000_000;

// Returns 42 from its runtime code; enough to stand in for any contract.
pub const CREATION_BYTECODE: &str = "0x600a600c600039600a6000f3602a60005260206000f3";

pub fn setup_tracing() {
    let _ = fmt()
        .with_max_level(LevelFilter::DEBUG)
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn dev_wallet() -> Arc<dyn DeployerSigner> {
    let wallet: LocalWallet = DEV_KEY.parse().expect("valid dev key");
    Arc::new(wallet)
}

/// Writes Hardhat-style artifacts for `Token` and `StableSwap` (neither has a
/// constructor) and `OwnedToken` (constructor `(address owner, uint256 supply)`).
pub fn artifact_fixture() -> (TempDir, ArtifactStore) {
    let dir = TempDir::new("artifacts").expect("temp dir");
    let contracts = dir.path().join("contracts");
    write_artifact(&contracts.join("Token.sol"), "Token", "[]");
    write_artifact(&contracts.join("StableSwap.sol"), "StableSwap", "[]");
    write_artifact(
        &contracts.join("OwnedToken.sol"),
        "OwnedToken",
        r#"[{"type":"constructor","stateMutability":"nonpayable","inputs":[
            {"name":"owner","type":"address","internalType":"address"},
            {"name":"supply","type":"uint256","internalType":"uint256"}]}]"#,
    );
    fs::create_dir_all(dir.path().join("build-info")).expect("build-info dir");
    let store = ArtifactStore::new(dir.path());
    (dir, store)
}

fn write_artifact(dir: &Path, name: &str, abi: &str) {
    fs::create_dir_all(dir).expect("artifact dir");
    let json = format!(
        r#"{{"_format":"hh-sol-artifact-1","contractName":"{name}","sourceName":"contracts/{name}.sol","abi":{abi},"bytecode":"{CREATION_BYTECODE}","deployedBytecode":"0x602a60005260206000f3","linkReferences":{{}},"deployedLinkReferences":{{}}}}"#
    );
    fs::write(dir.join(format!("{name}.json")), json).expect("write artifact");
}

pub fn fast_options() -> DeploymentOptions {
    DeploymentOptions {
        poll_interval: Duration::from_millis(5),
        confirmation_timeout: Some(Duration::from_secs(5)),
        gas_limit_buffer_percentage: 20,
    }
}

pub fn deployer_with(network: FakeNetwork) -> (TempDir, Deployer<FakeNetwork>) {
    let (dir, store) = artifact_fixture();
    (dir, Deployer::new(network, store, fast_options()))
}

/// How the fake node should misbehave.
#[derive(Debug, Clone, Default)]
pub struct Behaviour {
    pub balance: Option<U256>,
    pub estimate_error: Option<String>,
    pub send_error: Option<String>,
    pub revert_on_chain: bool,
    pub never_confirm: bool,
    pub omit_contract_address: bool,
    /// Latest block has no base fee, as on pre-London chains.
    pub legacy_fees: bool,
    /// Receipt lookups answered with `None` before the receipt shows up.
    pub pending_polls: usize,
}

#[derive(Debug, Clone)]
struct Pending {
    receipt: TransactionReceipt,
    polls_left: usize,
}

/// In-memory node: assigns nonces per sender, derives contract addresses the
/// way the EVM does, and mines on demand.
#[derive(Debug, Default)]
pub struct FakeNetwork {
    behaviour: Behaviour,
    rpc_calls: AtomicUsize,
    nonces: Mutex<HashMap<Address, u64>>,
    last_sender: Mutex<Option<(Address, u64)>>,
    sent: Mutex<Vec<Bytes>>,
    pending: Mutex<HashMap<TxHash, Pending>>,
    mined: Mutex<HashMap<TxHash, TransactionReceipt>>,
}

impl FakeNetwork {
    pub fn new(behaviour: Behaviour) -> Self {
        Self { behaviour, ..Default::default() }
    }

    pub fn rpc_calls(&self) -> usize {
        self.rpc_calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_hashes(&self) -> Vec<TxHash> {
        self.sent().iter().map(|raw| H256::from(keccak256(raw))).collect()
    }

    pub fn mined_receipt(&self, tx_hash: TxHash) -> Option<TransactionReceipt> {
        self.mined.lock().unwrap().get(&tx_hash).cloned()
    }

    fn tick(&self) {
        self.rpc_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeployNetwork for FakeNetwork {
    async fn chain_id(&self) -> Result<u64, DeploymentError> {
        self.tick();
        Ok(CHAIN_ID)
    }

    async fn balance(&self, _account: Address) -> Result<U256, DeploymentError> {
        self.tick();
        Ok(self.behaviour.balance.unwrap_or_else(|| U256::exp10(22)))
    }

    async fn supports_eip1559(&self) -> Result<bool, DeploymentError> {
        self.tick();
        Ok(!self.behaviour.legacy_fees)
    }

    async fn fill_transaction(&self, tx: &mut TypedTransaction) -> Result<(), DeploymentError> {
        self.tick();
        if let Some(message) = &self.behaviour.estimate_error {
            return Err(DeploymentError::from_rpc(message.clone()));
        }
        if self.behaviour.legacy_fees && !matches!(tx, TypedTransaction::Legacy(_)) {
            return Err(DeploymentError::from_rpc("EIP-1559 not activated"));
        }
        let from = *tx.from().expect("deployer sets from");
        let nonce = *self.nonces.lock().unwrap().entry(from).or_default();
        tx.set_nonce(nonce);
        tx.set_gas(GAS_ESTIMATE);
        tx.set_gas_price(MAX_FEE_WEI);
        *self.last_sender.lock().unwrap() = Some((from, nonce));
        Ok(())
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, DeploymentError> {
        self.tick();
        if let Some(message) = &self.behaviour.send_error {
            return Err(DeploymentError::from_rpc(message.clone()));
        }
        let (from, nonce) = self.last_sender.lock().unwrap().take().expect("filled before send");
        *self.nonces.lock().unwrap().entry(from).or_default() += 1;

        let tx_hash = H256::from(keccak256(&raw));
        self.sent.lock().unwrap().push(raw);

        let receipt = TransactionReceipt {
            transaction_hash: tx_hash,
            from,
            to: None,
            contract_address: (!self.behaviour.omit_contract_address).then(|| get_contract_address(from, nonce)),
            block_number: Some(U64::from(nonce + 1)),
            gas_used: Some(U256::from(GAS_ESTIMATE / 2)),
            status: Some(if self.behaviour.revert_on_chain { U64::zero() } else { U64::one() }),
            ..Default::default()
        };
        self.pending
            .lock()
            .unwrap()
            .insert(tx_hash, Pending { receipt, polls_left: self.behaviour.pending_polls });
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TransactionReceipt>, DeploymentError> {
        self.tick();
        if self.behaviour.never_confirm {
            return Ok(None);
        }
        let mut pending = self.pending.lock().unwrap();
        let Some(entry) = pending.get_mut(&tx_hash) else {
            return Ok(self.mined_receipt(tx_hash));
        };
        if entry.polls_left > 0 {
            entry.polls_left -= 1;
            return Ok(None);
        }
        let receipt = entry.receipt.clone();
        pending.remove(&tx_hash);
        self.mined.lock().unwrap().insert(tx_hash, receipt.clone());
        Ok(Some(receipt))
    }
}

/// Signer that refuses everything, like a hardware wallet on "reject".
#[derive(Debug)]
pub struct RejectingSigner;

#[async_trait]
impl DeployerSigner for RejectingSigner {
    fn address(&self) -> Address {
        Address::repeat_byte(0x42)
    }

    async fn sign_transaction(&self, _tx: &TypedTransaction) -> Result<Signature, DeploymentError> {
        Err(DeploymentError::Signer("user rejected the request".into()))
    }
}

/// Reporter whose storage is always unavailable.
pub struct BrokenReporter;

impl DeploymentReporter for BrokenReporter {
    fn record(&self, _deployed: &DeployedContract) -> Result<(), ReportingError> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "deployments/ is read-only").into())
    }
}
