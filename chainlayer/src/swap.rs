// Hash-time-locked swap sequencing.
//
// A swap progresses Created -> Initiated -> Verified -> Claimed or Refunded;
// claim and refund are mutually exclusive terminal outcomes decided by
// off-engine timing. The engine sequences nothing by itself: it exposes the
// matching operations, validates their format contracts, and reuses the
// resolution path for each step. The one derived value it computes locally
// is the deterministic claim/refund secret.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::client::{expect_hex_string, expect_present, expect_string, Client};
use crate::error::Error;
use crate::provider::Method;
use crate::schema::ensure_hex;
use crate::types::SwapParameters;

impl Client {
    /// Computes the chain-specific locking script for the swap.
    pub async fn create_swap_script(&self, swap: &SwapParameters) -> Result<Value, Error> {
        swap.validate()?;
        let provider = self.resolve_provider(Method::CreateSwapScript, None)?;
        let script = provider.create_swap_script(swap).await?;
        expect_present(script, "script")
    }

    /// Broadcasts the locking transaction. Returns its transaction id.
    pub async fn initiate_swap(&self, swap: &SwapParameters) -> Result<String, Error> {
        swap.validate()?;
        let provider = self.resolve_provider(Method::InitiateSwap, None)?;
        let txid = provider.initiate_swap(swap).await?;
        expect_string(&txid, "txid")
    }

    /// Confirms that the on-chain locking transaction matches the agreed
    /// swap parameters. The verification report is provider-specific.
    pub async fn verify_initiate_swap_transaction(
        &self,
        init_tx_hash: &str,
        swap: &SwapParameters,
    ) -> Result<Value, Error> {
        ensure_hex("init_tx_hash", init_tx_hash)?;
        swap.validate()?;
        let provider = self.resolve_provider(Method::VerifyInitiateSwapTransaction, None)?;
        let report = provider
            .verify_initiate_swap_transaction(init_tx_hash, swap)
            .await?;
        expect_present(report, "verification")
    }

    /// Releases the locked funds to the recipient by revealing the secret.
    pub async fn claim_swap(
        &self,
        init_tx_hash: &str,
        swap: &SwapParameters,
        secret: &str,
    ) -> Result<String, Error> {
        ensure_hex("init_tx_hash", init_tx_hash)?;
        ensure_hex("secret", secret)?;
        swap.validate()?;
        let provider = self.resolve_provider(Method::ClaimSwap, None)?;
        let txid = provider.claim_swap(init_tx_hash, swap, secret).await?;
        expect_string(&txid, "txid")
    }

    /// Returns the locked funds to the refund address once the expiration
    /// has elapsed.
    pub async fn refund_swap(
        &self,
        init_tx_hash: &str,
        swap: &SwapParameters,
    ) -> Result<String, Error> {
        ensure_hex("init_tx_hash", init_tx_hash)?;
        swap.validate()?;
        let provider = self.resolve_provider(Method::RefundSwap, None)?;
        let txid = provider.refund_swap(init_tx_hash, swap).await?;
        expect_string(&txid, "txid")
    }

    /// Scans for the counterparty's locking transaction. Validated against
    /// the compiled transaction schema.
    pub async fn find_initiate_swap_transaction(
        &self,
        swap: &SwapParameters,
    ) -> Result<Value, Error> {
        swap.validate()?;
        let provider = self.resolve_provider(Method::FindInitiateSwapTransaction, None)?;
        let transaction = provider.find_initiate_swap_transaction(swap).await?;
        self.check_transaction(transaction)
    }

    /// Scans for the claim transaction spending the given lock. Validated
    /// against the compiled transaction schema.
    pub async fn find_claim_swap_transaction(
        &self,
        init_tx_hash: &str,
        swap: &SwapParameters,
    ) -> Result<Value, Error> {
        ensure_hex("init_tx_hash", init_tx_hash)?;
        swap.validate()?;
        let provider = self.resolve_provider(Method::FindClaimSwapTransaction, None)?;
        let transaction = provider
            .find_claim_swap_transaction(init_tx_hash, swap)
            .await?;
        self.check_transaction(transaction)
    }

    /// Extracts the revealed secret from an on-chain claim transaction.
    pub async fn get_swap_secret(&self, claim_tx_hash: &str) -> Result<String, Error> {
        ensure_hex("claim_tx_hash", claim_tx_hash)?;
        let provider = self.resolve_provider(Method::GetSwapSecret, None)?;
        let secret = provider.get_swap_secret(claim_tx_hash).await?;
        expect_hex_string(&secret, "secret")
    }

    /// Derives a claim/refund secret deterministically: the first address of
    /// the bound signing provider signs `message`, and the secret is the
    /// SHA-256 digest of that signature, hex-encoded.
    ///
    /// Determinism means the secret can be regenerated from the same inputs
    /// after a crash, without any stored state.
    pub async fn generate_secret(&self, message: &str) -> Result<String, Error> {
        let addresses = self.get_addresses().await?;
        let address = first_address(&addresses)?;
        let signature = self.sign_message(message, &address).await?;
        let signature_hex = expect_hex_string(&signature, "signature")?;
        let signature_bytes = hex::decode(&signature_hex)
            .map_err(|e| Error::invalid_response("signature", e.to_string()))?;
        Ok(hex::encode(Sha256::digest(&signature_bytes)))
    }
}

// Providers report addresses either as plain strings or as objects carrying
// an `address` field; accept both.
fn first_address(addresses: &Value) -> Result<String, Error> {
    let first = addresses
        .as_array()
        .and_then(|list| list.first())
        .ok_or_else(|| Error::invalid_response("addresses", "expected a non-empty array"))?;
    match first {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => map
            .get("address")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::invalid_response("addresses.0.address", "expected a string")),
        _ => Err(Error::invalid_response(
            "addresses.0",
            "expected a string or an object with an `address` field",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_transaction, MockSwapProvider, SigningWalletProvider};
    use serde_json::json;

    fn swap_params() -> SwapParameters {
        SwapParameters {
            value: 250_000,
            recipient_address: "recipient".into(),
            refund_address: "refund".into(),
            secret_hash: "9f".repeat(32),
            expiration: 1_800_000_000,
        }
    }

    fn swap_client() -> (Client, std::sync::Arc<MockSwapProvider>) {
        let client = Client::new("1.0.0");
        let provider = MockSwapProvider::new();
        client.register(provider.clone()).unwrap();
        (client, provider)
    }

    #[tokio::test]
    async fn initiate_and_claim_return_txids() {
        let (client, provider) = swap_client();
        let params = swap_params();

        let init = client.initiate_swap(&params).await.unwrap();
        assert!(!init.is_empty());

        let claim = client
            .claim_swap(&init, &params, &"55".repeat(32))
            .await
            .unwrap();
        assert!(!claim.is_empty());
        assert_eq!(
            provider.calls(),
            vec![Method::InitiateSwap, Method::ClaimSwap]
        );
    }

    #[tokio::test]
    async fn swap_inputs_are_checked_before_dispatch() {
        let (client, provider) = swap_client();
        let mut params = swap_params();
        params.secret_hash = "not-hex".into();

        assert!(matches!(
            client.initiate_swap(&params).await.unwrap_err(),
            Error::InvalidArgument { field: "secret_hash", .. }
        ));
        assert!(matches!(
            client
                .claim_swap("zz", &swap_params(), &"55".repeat(32))
                .await
                .unwrap_err(),
            Error::InvalidArgument { field: "init_tx_hash", .. }
        ));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn found_swap_transactions_are_schema_validated() {
        let (client, provider) = swap_client();
        provider.respond(Method::FindInitiateSwapTransaction, sample_transaction());
        let tx = client
            .find_initiate_swap_transaction(&swap_params())
            .await
            .unwrap();
        assert!(tx["hash"].is_string());

        provider.respond(
            Method::FindClaimSwapTransaction,
            json!({ "hash": "dd44", "value": "not a number" }),
        );
        match client
            .find_claim_swap_transaction("aa", &swap_params())
            .await
            .unwrap_err()
        {
            Error::InvalidProviderResponse { path, .. } => assert_eq!(path, "value"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn swap_secret_output_must_be_hex() {
        let (client, provider) = swap_client();
        provider.respond(Method::GetSwapSecret, json!("c0ffee"));
        assert_eq!(client.get_swap_secret("aa").await.unwrap(), "c0ffee");

        provider.respond(Method::GetSwapSecret, json!("secret!"));
        match client.get_swap_secret("aa").await.unwrap_err() {
            Error::InvalidProviderResponse { path, .. } => assert_eq!(path, "secret"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn generated_secret_is_deterministic() {
        let client = Client::new("1.0.0");
        client.register(SigningWalletProvider::from_seed(42)).unwrap();

        let first = client.generate_secret("liquidity epoch 9").await.unwrap();
        let second = client.generate_secret("liquidity epoch 9").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64); // SHA-256, hex-encoded

        let other = client.generate_secret("liquidity epoch 10").await.unwrap();
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn generated_secret_differs_per_signer() {
        let client_a = Client::new("1.0.0");
        client_a.register(SigningWalletProvider::from_seed(1)).unwrap();
        let client_b = Client::new("1.0.0");
        client_b.register(SigningWalletProvider::from_seed(2)).unwrap();

        let a = client_a.generate_secret("same message").await.unwrap();
        let b = client_b.generate_secret("same message").await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn first_address_accepts_both_shapes() {
        assert_eq!(first_address(&json!(["addr1", "addr2"])).unwrap(), "addr1");
        assert_eq!(
            first_address(&json!([{ "address": "addr1" }])).unwrap(),
            "addr1"
        );
        assert!(first_address(&json!([])).is_err());
        assert!(first_address(&json!([42])).is_err());
    }
}
