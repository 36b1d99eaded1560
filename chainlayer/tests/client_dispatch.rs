// chainlayer/tests/client_dispatch.rs
//
// End-to-end dispatch tests: a client assembled from several mock providers,
// exercising the full register -> resolve -> execute -> validate path,
// decorator delegation through the requestor window, and the swap and
// collateral protocol sequences.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use chainlayer::test_utils::{
    HeightOffsetProvider, MockChainProvider, MockCollateralProvider, MockSwapProvider,
    SigningWalletProvider,
};
use chainlayer::{
    Client, CollateralParameters, CollateralParty, CollateralValues, Error, Expirations, Method,
    PartyKeys, Provider, ProviderError, ProviderKind, SecretHashes, SwapParameters,
};

fn full_client() -> Client {
    let client = Client::new("1.0.0");
    client
        .register(MockChainProvider::new())
        .and_then(|c| c.register(SigningWalletProvider::from_seed(9)))
        .and_then(|c| c.register(MockSwapProvider::new()))
        .and_then(|c| c.register(MockCollateralProvider::new()))
        .expect("setup registration");
    client
}

fn swap_params(secret_hash: &str) -> SwapParameters {
    SwapParameters {
        value: 500_000,
        recipient_address: "recipient-addr".into(),
        refund_address: "refund-addr".into(),
        secret_hash: secret_hash.into(),
        expiration: 1_900_000_000,
    }
}

fn collateral_params() -> CollateralParameters {
    CollateralParameters {
        values: CollateralValues { refundable: 80_000, seizable: 20_000 },
        keys: PartyKeys {
            borrower_pub_key: "02".repeat(33),
            lender_pub_key: "03".repeat(33),
        },
        secret_hashes: SecretHashes {
            a1: "a1".repeat(32),
            a2: "a2".repeat(32),
            b2: "b2".repeat(32),
            b3: "b3".repeat(32),
        },
        expirations: Expirations { loan: 10_000, bidding: 20_000, seizure: 30_000 },
    }
}

#[tokio::test]
async fn operations_route_to_the_provider_that_implements_them() {
    let client = full_client();

    // Chain ops land on the chain mock, wallet ops on the wallet mock, even
    // though the wallet/swap/collateral providers sit above the chain one.
    let height = client.get_block_height().await.unwrap();
    assert_eq!(height, 1_337);

    let addresses = client.get_addresses().await.unwrap();
    assert_eq!(addresses.as_array().unwrap().len(), 1);

    let balance = client
        .get_balance(&["some-address".to_string()])
        .await
        .unwrap();
    assert_eq!(balance, 1_000_000);
}

#[tokio::test]
async fn decorator_delegates_beneath_itself_via_the_requestor_window() {
    let client = full_client();
    // Registered last, the decorator outranks the chain provider for
    // get_block_height and delegates downward with itself as requestor.
    client.register(HeightOffsetProvider::new(5)).unwrap();

    let height = client.get_block_height().await.unwrap();
    assert_eq!(height, 1_337 + 5);
}

#[tokio::test]
async fn swap_lifecycle_released_by_secret() {
    let client = full_client();

    // Created: derive the deterministic secret and commit to it.
    let secret = client.generate_secret("swap #1").await.unwrap();
    let commitment = hex::encode(Sha256::digest(hex::decode(&secret).unwrap()));
    let params = swap_params(&commitment);

    let script = client.create_swap_script(&params).await.unwrap();
    assert!(script.is_string());

    // Initiated.
    let init_txid = client.initiate_swap(&params).await.unwrap();

    // Verified by the counterparty.
    client
        .verify_initiate_swap_transaction(&init_txid, &params)
        .await
        .unwrap();

    // Claimed: the secret is revealed on-chain and extractable again.
    let claim_txid = client.claim_swap(&init_txid, &params, &secret).await.unwrap();
    let revealed = client.get_swap_secret(&claim_txid).await.unwrap();
    assert!(revealed.chars().all(|c| c.is_ascii_hexdigit()));

    // Refund remains available as the alternate terminal path; the engine
    // only validates and dispatches it.
    let refund_txid = client.refund_swap(&init_txid, &params).await.unwrap();
    assert_ne!(claim_txid, refund_txid);
}

#[tokio::test]
async fn collateral_lifecycle_covers_all_three_settlement_paths() {
    let client = full_client();
    let params = collateral_params();

    let txids = client.lock_collateral(&params).await.unwrap();

    // Repaid.
    client
        .refund_collateral(&txids, &params, &"b2".repeat(32))
        .await
        .unwrap();

    // Negotiated.
    let signatures = client
        .multisig_sign_collateral(&txids, &params, CollateralParty::Lender, "settle-addr")
        .await
        .unwrap();
    let sigs: Vec<String> = signatures
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap().to_owned())
        .collect();
    client
        .multisig_send_collateral(&txids, &params, &sigs, &sigs, "settle-addr")
        .await
        .unwrap();

    // Defaulted: seizure and the borrower's independent reclaim.
    client
        .seize_collateral(&txids.seizable, &params, &"a1".repeat(32))
        .await
        .unwrap();
    client
        .reclaim_collateral(&txids.refundable, &params)
        .await
        .unwrap();
}

// A provider that implements an op but declares it unsupported beyond a
// version boundary.
struct LegacyHeightProvider;

#[async_trait]
impl Provider for LegacyHeightProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind("legacy-height")
    }

    fn capabilities(&self) -> &[Method] {
        &[Method::Bind, Method::VersionGate, Method::GetBlockHeight]
    }

    fn supports_method(&self, method: Method, version: &str) -> bool {
        method == Method::GetBlockHeight && version.starts_with("0.")
    }

    async fn get_block_height(&self) -> Result<Value, ProviderError> {
        Ok(json!(7))
    }
}

#[tokio::test]
async fn version_gate_failure_is_terminal_even_with_older_alternatives() {
    let client = Client::new("1.0.0");
    client.register(MockChainProvider::new()).unwrap();
    client.register(Arc::new(LegacyHeightProvider)).unwrap();

    // The chain mock beneath would happily serve the call, but the scan
    // stops at the first capability match.
    match client.get_block_height().await.unwrap_err() {
        Error::UnsupportedMethod { method, kind, version } => {
            assert_eq!(method, Method::GetBlockHeight);
            assert_eq!(kind, ProviderKind("legacy-height"));
            assert_eq!(version, "1.0.0");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // At a compatible target version the same stack resolves fine.
    let old_client = Client::new("0.9.0");
    old_client.register(MockChainProvider::new()).unwrap();
    old_client.register(Arc::new(LegacyHeightProvider)).unwrap();
    assert_eq!(old_client.get_block_height().await.unwrap(), 7);
}

#[tokio::test]
async fn provider_failures_propagate_unmodified() {
    let client = Client::new("1.0.0");
    client.register(SigningWalletProvider::random()).unwrap();

    // Signing with an address the wallet does not manage is a provider-side
    // failure; the core forwards it without reinterpretation.
    match client.sign_message("msg", "unknown-address").await.unwrap_err() {
        Error::Provider(e) => assert!(e.to_string().contains("unknown signing address")),
        other => panic!("unexpected error: {other:?}"),
    }
}
