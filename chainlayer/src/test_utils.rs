// Shared mock providers for unit and integration tests.
//
// The mocks record which operations were dispatched to them (so tests can
// assert that input validation fires before any provider is reached) and
// return canned responses that can be overridden per test.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use serde_json::{json, Value};

use crate::client::WeakClient;
use crate::provider::{Method, Provider, ProviderError, ProviderKind};
use crate::types::{CollateralLockTxids, CollateralParameters, CollateralParty, SwapParameters};

/// A block conforming to the default block schema.
pub fn sample_block() -> Value {
    json!({
        "hash": "f0".repeat(32),
        "number": 1_337,
        "parentHash": "e1".repeat(32),
        "timestamp": 1_700_000_000u64,
    })
}

/// A transaction conforming to the default transaction schema.
pub fn sample_transaction() -> Value {
    json!({
        "hash": "d2".repeat(32),
        "value": 250_000,
        "blockHash": "f0".repeat(32),
    })
}

// Canned-response bookkeeping shared by the mocks.
#[derive(Default)]
struct Script {
    responses: Mutex<HashMap<Method, Value>>,
    calls: Mutex<Vec<Method>>,
}

impl Script {
    fn respond(&self, method: Method, value: Value) {
        self.responses.lock().unwrap().insert(method, value);
    }

    fn record(&self, method: Method, fallback: impl FnOnce() -> Value) -> Value {
        self.calls.lock().unwrap().push(method);
        self.responses
            .lock()
            .unwrap()
            .get(&method)
            .cloned()
            .unwrap_or_else(fallback)
    }

    fn calls(&self) -> Vec<Method> {
        self.calls.lock().unwrap().clone()
    }
}

fn txid(tag: u8) -> String {
    hex::encode([tag; 32])
}

/// Chain-operation mock ("node" side of a backend).
pub struct MockChainProvider {
    script: Script,
}

impl MockChainProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(MockChainProvider { script: Script::default() })
    }

    pub fn respond(&self, method: Method, value: Value) {
        self.script.respond(method, value);
    }

    pub fn calls(&self) -> Vec<Method> {
        self.script.calls()
    }
}

#[async_trait]
impl Provider for MockChainProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind("mock-chain")
    }

    fn capabilities(&self) -> &[Method] {
        &[
            Method::Bind,
            Method::GenerateBlock,
            Method::GetBlockByHash,
            Method::GetBlockByNumber,
            Method::GetBlockHeight,
            Method::GetTransactionByHash,
            Method::GetBalance,
            Method::SendTransaction,
            Method::SendRawTransaction,
        ]
    }

    async fn generate_block(&self, count: u64) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::GenerateBlock, || {
            let hashes: Vec<String> = (0..count).map(|i| txid(i as u8)).collect();
            json!(hashes)
        }))
    }

    async fn get_block_by_hash(
        &self,
        _block_hash: &str,
        _include_tx: bool,
    ) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::GetBlockByHash, sample_block))
    }

    async fn get_block_by_number(
        &self,
        _block_number: u64,
        _include_tx: bool,
    ) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::GetBlockByNumber, sample_block))
    }

    async fn get_block_height(&self) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::GetBlockHeight, || json!(1_337)))
    }

    async fn get_transaction_by_hash(&self, _tx_hash: &str) -> Result<Value, ProviderError> {
        Ok(self
            .script
            .record(Method::GetTransactionByHash, sample_transaction))
    }

    async fn get_balance(&self, _addresses: &[String]) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::GetBalance, || json!(1_000_000)))
    }

    async fn send_transaction(
        &self,
        _to: &str,
        _value: u64,
        _data: Option<&str>,
    ) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::SendTransaction, || json!(txid(0xA0))))
    }

    async fn send_raw_transaction(&self, _raw_tx: &str) -> Result<Value, ProviderError> {
        Ok(self
            .script
            .record(Method::SendRawTransaction, || json!(txid(0xA1))))
    }
}

/// Wallet mock with a real, deterministic Ed25519 key so signature-derived
/// values (the swap secret) are stable across runs for the same seed.
pub struct SigningWalletProvider {
    signing_key: SigningKey,
    address: String,
}

impl SigningWalletProvider {
    pub fn from_seed(seed: u8) -> Arc<Self> {
        let signing_key = SigningKey::from_bytes(&[seed; 32]);
        let address = hex::encode(signing_key.verifying_key().as_bytes());
        Arc::new(SigningWalletProvider { signing_key, address })
    }

    pub fn random() -> Arc<Self> {
        let signing_key = SigningKey::generate(&mut OsRng);
        let address = hex::encode(signing_key.verifying_key().as_bytes());
        Arc::new(SigningWalletProvider { signing_key, address })
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl Provider for SigningWalletProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind("mock-wallet")
    }

    fn capabilities(&self) -> &[Method] {
        &[
            Method::Bind,
            Method::GetAddresses,
            Method::GetUsedAddresses,
            Method::GetUnusedAddress,
            Method::SignMessage,
            Method::GetWalletInfo,
        ]
    }

    async fn get_addresses(&self) -> Result<Value, ProviderError> {
        Ok(json!([{ "address": self.address }]))
    }

    async fn get_used_addresses(&self) -> Result<Value, ProviderError> {
        Ok(json!([]))
    }

    async fn get_unused_address(&self) -> Result<Value, ProviderError> {
        Ok(json!({ "address": self.address }))
    }

    async fn sign_message(&self, message: &str, from: &str) -> Result<Value, ProviderError> {
        if from != self.address {
            return Err(format!("unknown signing address: {from}").into());
        }
        let signature = self.signing_key.sign(message.as_bytes());
        Ok(json!(hex::encode(signature.to_bytes())))
    }

    async fn get_wallet_info(&self) -> Result<Value, ProviderError> {
        Ok(json!({ "ready": true, "addresses": 1 }))
    }
}

/// Swap-operation mock.
pub struct MockSwapProvider {
    script: Script,
}

impl MockSwapProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(MockSwapProvider { script: Script::default() })
    }

    pub fn respond(&self, method: Method, value: Value) {
        self.script.respond(method, value);
    }

    pub fn calls(&self) -> Vec<Method> {
        self.script.calls()
    }
}

#[async_trait]
impl Provider for MockSwapProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind("mock-swap")
    }

    fn capabilities(&self) -> &[Method] {
        &[
            Method::Bind,
            Method::CreateSwapScript,
            Method::InitiateSwap,
            Method::VerifyInitiateSwapTransaction,
            Method::ClaimSwap,
            Method::RefundSwap,
            Method::FindInitiateSwapTransaction,
            Method::FindClaimSwapTransaction,
            Method::GetSwapSecret,
        ]
    }

    async fn create_swap_script(&self, _swap: &SwapParameters) -> Result<Value, ProviderError> {
        Ok(self
            .script
            .record(Method::CreateSwapScript, || json!(hex::encode([0x51; 40]))))
    }

    async fn initiate_swap(&self, _swap: &SwapParameters) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::InitiateSwap, || json!(txid(0xB0))))
    }

    async fn verify_initiate_swap_transaction(
        &self,
        _init_tx_hash: &str,
        _swap: &SwapParameters,
    ) -> Result<Value, ProviderError> {
        Ok(self
            .script
            .record(Method::VerifyInitiateSwapTransaction, || json!(true)))
    }

    async fn claim_swap(
        &self,
        _init_tx_hash: &str,
        _swap: &SwapParameters,
        _secret: &str,
    ) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::ClaimSwap, || json!(txid(0xB1))))
    }

    async fn refund_swap(
        &self,
        _init_tx_hash: &str,
        _swap: &SwapParameters,
    ) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::RefundSwap, || json!(txid(0xB2))))
    }

    async fn find_initiate_swap_transaction(
        &self,
        _swap: &SwapParameters,
    ) -> Result<Value, ProviderError> {
        Ok(self
            .script
            .record(Method::FindInitiateSwapTransaction, sample_transaction))
    }

    async fn find_claim_swap_transaction(
        &self,
        _init_tx_hash: &str,
        _swap: &SwapParameters,
    ) -> Result<Value, ProviderError> {
        Ok(self
            .script
            .record(Method::FindClaimSwapTransaction, sample_transaction))
    }

    async fn get_swap_secret(&self, _claim_tx_hash: &str) -> Result<Value, ProviderError> {
        Ok(self
            .script
            .record(Method::GetSwapSecret, || json!(hex::encode([0x5e; 32]))))
    }
}

/// Collateral-operation mock.
pub struct MockCollateralProvider {
    script: Script,
}

impl MockCollateralProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(MockCollateralProvider { script: Script::default() })
    }

    pub fn respond(&self, method: Method, value: Value) {
        self.script.respond(method, value);
    }

    pub fn calls(&self) -> Vec<Method> {
        self.script.calls()
    }
}

#[async_trait]
impl Provider for MockCollateralProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind("mock-collateral")
    }

    fn capabilities(&self) -> &[Method] {
        &[
            Method::Bind,
            Method::CreateCollateralScripts,
            Method::LockCollateral,
            Method::RefundCollateral,
            Method::SeizeCollateral,
            Method::ReclaimCollateral,
            Method::MultisigSignCollateral,
            Method::MultisigSendCollateral,
        ]
    }

    async fn create_collateral_scripts(
        &self,
        _collateral: &CollateralParameters,
    ) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::CreateCollateralScripts, || {
            json!({
                "refundable": hex::encode([0x52; 40]),
                "seizable": hex::encode([0x53; 40]),
            })
        }))
    }

    async fn lock_collateral(
        &self,
        _collateral: &CollateralParameters,
    ) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::LockCollateral, || {
            json!({ "refundable": txid(0xC0), "seizable": txid(0xC1) })
        }))
    }

    async fn refund_collateral(
        &self,
        _lock_txids: &CollateralLockTxids,
        _collateral: &CollateralParameters,
        _secret_b2: &str,
    ) -> Result<Value, ProviderError> {
        Ok(self
            .script
            .record(Method::RefundCollateral, || json!(txid(0xC2))))
    }

    async fn seize_collateral(
        &self,
        _seizable_tx_hash: &str,
        _collateral: &CollateralParameters,
        _secret_a1: &str,
    ) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::SeizeCollateral, || json!(txid(0xC3))))
    }

    async fn reclaim_collateral(
        &self,
        _refundable_tx_hash: &str,
        _collateral: &CollateralParameters,
    ) -> Result<Value, ProviderError> {
        Ok(self
            .script
            .record(Method::ReclaimCollateral, || json!(txid(0xC4))))
    }

    async fn multisig_sign_collateral(
        &self,
        _lock_txids: &CollateralLockTxids,
        _collateral: &CollateralParameters,
        _party: CollateralParty,
        _to: &str,
    ) -> Result<Value, ProviderError> {
        Ok(self.script.record(Method::MultisigSignCollateral, || {
            json!([hex::encode([0x30; 64]), hex::encode([0x31; 64])])
        }))
    }

    async fn multisig_send_collateral(
        &self,
        _lock_txids: &CollateralLockTxids,
        _collateral: &CollateralParameters,
        _borrower_signatures: &[String],
        _lender_signatures: &[String],
        _to: &str,
    ) -> Result<Value, ProviderError> {
        Ok(self
            .script
            .record(Method::MultisigSendCollateral, || json!(txid(0xC5))))
    }
}

/// A decorator provider: overrides `get_block_height` and delegates to the
/// provider beneath it by passing itself as the requestor, so resolution can
/// never route back into it or anything stacked above it.
pub struct HeightOffsetProvider {
    offset: u64,
    client: Mutex<Option<WeakClient>>,
}

impl HeightOffsetProvider {
    pub fn new(offset: u64) -> Arc<Self> {
        Arc::new(HeightOffsetProvider {
            offset,
            client: Mutex::new(None),
        })
    }
}

#[async_trait]
impl Provider for HeightOffsetProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind("height-offset")
    }

    fn capabilities(&self) -> &[Method] {
        &[Method::Bind, Method::GetBlockHeight]
    }

    fn bind(&self, client: WeakClient) {
        *self.client.lock().unwrap() = Some(client);
    }

    async fn get_block_height(&self) -> Result<Value, ProviderError> {
        let weak = self
            .client
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| -> ProviderError { "provider is not bound".into() })?;
        let client = weak
            .upgrade()
            .ok_or_else(|| -> ProviderError { "owning client was dropped".into() })?;
        let beneath = client
            .resolve_provider(Method::GetBlockHeight, Some(self.kind()))
            .map_err(|e| -> ProviderError { Box::new(e) })?;
        let height = beneath.get_block_height().await?;
        let height = height
            .as_u64()
            .ok_or_else(|| -> ProviderError { "underlying height is not a number".into() })?;
        Ok(json!(height + self.offset))
    }
}
