// Chain operations facade.
//
// Each operation validates its caller-supplied inputs against the format
// contracts before any dispatch occurs, resolves the executing provider
// through the engine, and checks the provider's result against the
// applicable output contract.

use serde_json::Value;

use crate::client::{expect_hash_array, expect_number, expect_string, Client};
use crate::error::Error;
use crate::provider::Method;
use crate::schema::ensure_hex;

impl Client {
    /// Mines/generates `count` blocks, returning their hashes. The provider
    /// must return an array whose every element satisfies the hexadecimal
    /// hash contract.
    pub async fn generate_block(&self, count: u64) -> Result<Vec<String>, Error> {
        let provider = self.resolve_provider(Method::GenerateBlock, None)?;
        let result = provider.generate_block(count).await?;
        expect_hash_array(&result, "blocks")
    }

    /// Looks up a block by hash, optionally inlining its transactions.
    /// The result is validated against the compiled block schema.
    pub async fn get_block_by_hash(
        &self,
        block_hash: &str,
        include_tx: bool,
    ) -> Result<Value, Error> {
        ensure_hex("block_hash", block_hash)?;
        let provider = self.resolve_provider(Method::GetBlockByHash, None)?;
        let block = provider.get_block_by_hash(block_hash, include_tx).await?;
        self.check_block(block)
    }

    /// Looks up a block by height/number. The result is validated against
    /// the compiled block schema.
    pub async fn get_block_by_number(
        &self,
        block_number: u64,
        include_tx: bool,
    ) -> Result<Value, Error> {
        let provider = self.resolve_provider(Method::GetBlockByNumber, None)?;
        let block = provider.get_block_by_number(block_number, include_tx).await?;
        self.check_block(block)
    }

    /// Current chain tip height.
    pub async fn get_block_height(&self) -> Result<u64, Error> {
        let provider = self.resolve_provider(Method::GetBlockHeight, None)?;
        let height = provider.get_block_height().await?;
        expect_number(&height, "height")
    }

    /// Looks up a transaction by hash, validated against the compiled
    /// transaction schema.
    pub async fn get_transaction_by_hash(&self, tx_hash: &str) -> Result<Value, Error> {
        ensure_hex("tx_hash", tx_hash)?;
        let provider = self.resolve_provider(Method::GetTransactionByHash, None)?;
        let transaction = provider.get_transaction_by_hash(tx_hash).await?;
        self.check_transaction(transaction)
    }

    /// Combined balance of the given addresses.
    pub async fn get_balance(&self, addresses: &[String]) -> Result<u64, Error> {
        if addresses.is_empty() {
            return Err(Error::invalid_argument(
                "addresses",
                "at least one address is required",
            ));
        }
        let provider = self.resolve_provider(Method::GetBalance, None)?;
        let balance = provider.get_balance(addresses).await?;
        expect_number(&balance, "balance")
    }

    /// Builds, signs, and broadcasts a payment through the wallet-capable
    /// provider. Returns the transaction id.
    pub async fn send_transaction(
        &self,
        to: &str,
        value: u64,
        data: Option<&str>,
    ) -> Result<String, Error> {
        if let Some(data) = data {
            ensure_hex("data", data)?;
        }
        let provider = self.resolve_provider(Method::SendTransaction, None)?;
        let txid = provider.send_transaction(to, value, data).await?;
        expect_string(&txid, "txid")
    }

    /// Broadcasts an already-signed raw transaction. Returns the
    /// transaction id.
    pub async fn send_raw_transaction(&self, raw_tx: &str) -> Result<String, Error> {
        ensure_hex("raw_transaction", raw_tx)?;
        let provider = self.resolve_provider(Method::SendRawTransaction, None)?;
        let txid = provider.send_raw_transaction(raw_tx).await?;
        expect_string(&txid, "txid")
    }
}
