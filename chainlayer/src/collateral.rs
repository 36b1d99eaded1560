// Collateralized-loan sequencing.
//
// A loan is secured by two pools: refundable (returned to the borrower on
// repayment) and seizable (forfeit to the lender on default), each
// independently hash-locked. Three escalating deadlines stage the dispute
// window: repayment until `loan`, negotiation until `bidding`, unilateral
// seizure after `seizure`. States run Locked -> Repaid | Negotiated |
// Defaulted; as with swaps, which terminal path occurs is off-engine timing.
// Every operation here is a thin, input-validating delegate over the same
// resolution path the rest of the facade uses.

use serde_json::Value;

use crate::client::{expect_hex_string, expect_present, expect_string, Client};
use crate::error::Error;
use crate::provider::Method;
use crate::schema::ensure_hex;
use crate::types::{CollateralLockTxids, CollateralParameters, CollateralParty};

impl Client {
    /// Computes the refundable and seizable locking scripts.
    pub async fn create_collateral_scripts(
        &self,
        collateral: &CollateralParameters,
    ) -> Result<Value, Error> {
        collateral.validate()?;
        let provider = self.resolve_provider(Method::CreateCollateralScripts, None)?;
        let scripts = provider.create_collateral_scripts(collateral).await?;
        expect_present(scripts, "scripts")
    }

    /// Locks both collateral pools. The provider must return an object with
    /// `refundable` and `seizable` transaction ids, each a hexadecimal hash.
    pub async fn lock_collateral(
        &self,
        collateral: &CollateralParameters,
    ) -> Result<CollateralLockTxids, Error> {
        collateral.validate()?;
        let provider = self.resolve_provider(Method::LockCollateral, None)?;
        let result = provider.lock_collateral(collateral).await?;
        let object = result.as_object().ok_or_else(|| {
            Error::invalid_response("lock", "expected an object with refundable and seizable txids")
        })?;
        Ok(CollateralLockTxids {
            refundable: expect_hex_string(
                object.get("refundable").unwrap_or(&Value::Null),
                "refundable",
            )?,
            seizable: expect_hex_string(
                object.get("seizable").unwrap_or(&Value::Null),
                "seizable",
            )?,
        })
    }

    /// Repayment path: releases the refundable pool back to the borrower
    /// using the lender's B2 secret. Returns the settlement transaction id.
    pub async fn refund_collateral(
        &self,
        lock_txids: &CollateralLockTxids,
        collateral: &CollateralParameters,
        secret_b2: &str,
    ) -> Result<String, Error> {
        lock_txids.validate()?;
        ensure_hex("secret_b2", secret_b2)?;
        collateral.validate()?;
        let provider = self.resolve_provider(Method::RefundCollateral, None)?;
        let txid = provider
            .refund_collateral(lock_txids, collateral, secret_b2)
            .await?;
        expect_string(&txid, "txid")
    }

    /// Default path: the lender seizes the seizable pool after the seizure
    /// expiration, presenting the borrower's A1 secret.
    pub async fn seize_collateral(
        &self,
        seizable_tx_hash: &str,
        collateral: &CollateralParameters,
        secret_a1: &str,
    ) -> Result<String, Error> {
        ensure_hex("seizable_tx_hash", seizable_tx_hash)?;
        ensure_hex("secret_a1", secret_a1)?;
        collateral.validate()?;
        let provider = self.resolve_provider(Method::SeizeCollateral, None)?;
        let txid = provider
            .seize_collateral(seizable_tx_hash, collateral, secret_a1)
            .await?;
        expect_string(&txid, "txid")
    }

    /// After default, the borrower may still reclaim the refundable pool
    /// independently of the seizure.
    pub async fn reclaim_collateral(
        &self,
        refundable_tx_hash: &str,
        collateral: &CollateralParameters,
    ) -> Result<String, Error> {
        ensure_hex("refundable_tx_hash", refundable_tx_hash)?;
        collateral.validate()?;
        let provider = self.resolve_provider(Method::ReclaimCollateral, None)?;
        let txid = provider
            .reclaim_collateral(refundable_tx_hash, collateral)
            .await?;
        expect_string(&txid, "txid")
    }

    /// Negotiated path, first half: one party produces its multisig
    /// signatures over a settlement spending both pools to `to`. Signature
    /// encoding is provider-specific and passes through unchecked.
    pub async fn multisig_sign_collateral(
        &self,
        lock_txids: &CollateralLockTxids,
        collateral: &CollateralParameters,
        party: CollateralParty,
        to: &str,
    ) -> Result<Value, Error> {
        lock_txids.validate()?;
        collateral.validate()?;
        let provider = self.resolve_provider(Method::MultisigSignCollateral, None)?;
        let signatures = provider
            .multisig_sign_collateral(lock_txids, collateral, party, to)
            .await?;
        expect_present(signatures, "signatures")
    }

    /// Negotiated path, second half: combines both parties' signatures and
    /// broadcasts the co-signed settlement, short-circuiting the unilateral
    /// timeouts. Returns the settlement transaction id.
    pub async fn multisig_send_collateral(
        &self,
        lock_txids: &CollateralLockTxids,
        collateral: &CollateralParameters,
        borrower_signatures: &[String],
        lender_signatures: &[String],
        to: &str,
    ) -> Result<String, Error> {
        lock_txids.validate()?;
        collateral.validate()?;
        for signature in borrower_signatures {
            ensure_hex("borrower_signatures", signature)?;
        }
        for signature in lender_signatures {
            ensure_hex("lender_signatures", signature)?;
        }
        let provider = self.resolve_provider(Method::MultisigSendCollateral, None)?;
        let txid = provider
            .multisig_send_collateral(
                lock_txids,
                collateral,
                borrower_signatures,
                lender_signatures,
                to,
            )
            .await?;
        expect_string(&txid, "txid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockCollateralProvider;
    use crate::types::{CollateralValues, Expirations, PartyKeys, SecretHashes};
    use serde_json::json;
    use std::sync::Arc;

    fn collateral_params() -> CollateralParameters {
        CollateralParameters {
            values: CollateralValues { refundable: 70_000, seizable: 30_000 },
            keys: PartyKeys {
                borrower_pub_key: "02".repeat(33),
                lender_pub_key: "03".repeat(33),
            },
            secret_hashes: SecretHashes {
                a1: "1a".repeat(32),
                a2: "2a".repeat(32),
                b2: "2b".repeat(32),
                b3: "3b".repeat(32),
            },
            expirations: Expirations { loan: 1_000, bidding: 2_000, seizure: 3_000 },
        }
    }

    fn collateral_client() -> (Client, Arc<MockCollateralProvider>) {
        let client = Client::new("1.0.0");
        let provider = MockCollateralProvider::new();
        client.register(provider.clone()).unwrap();
        (client, provider)
    }

    #[tokio::test]
    async fn lock_returns_both_pool_txids() {
        let (client, _provider) = collateral_client();
        let txids = client.lock_collateral(&collateral_params()).await.unwrap();
        assert_ne!(txids.refundable, txids.seizable);
    }

    #[tokio::test]
    async fn lock_result_must_carry_both_pools() {
        let (client, provider) = collateral_client();
        provider.respond(Method::LockCollateral, json!({ "refundable": "aa11" }));
        match client.lock_collateral(&collateral_params()).await.unwrap_err() {
            Error::InvalidProviderResponse { path, .. } => assert_eq!(path, "seizable"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn escalating_deadlines_are_enforced_before_dispatch() {
        let (client, provider) = collateral_client();
        let mut params = collateral_params();
        params.expirations.seizure = params.expirations.bidding;
        assert!(matches!(
            client.lock_collateral(&params).await.unwrap_err(),
            Error::InvalidArgument { field: "expirations", .. }
        ));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn repayment_and_default_paths_return_txids() {
        let (client, _provider) = collateral_client();
        let params = collateral_params();
        let txids = client.lock_collateral(&params).await.unwrap();

        let repay = client
            .refund_collateral(&txids, &params, &"b2".repeat(32))
            .await
            .unwrap();
        assert!(!repay.is_empty());

        let seize = client
            .seize_collateral(&txids.seizable, &params, &"a1".repeat(32))
            .await
            .unwrap();
        let reclaim = client
            .reclaim_collateral(&txids.refundable, &params)
            .await
            .unwrap();
        assert!(!seize.is_empty());
        assert!(!reclaim.is_empty());
    }

    #[tokio::test]
    async fn negotiated_settlement_round_trips_signatures() {
        let (client, _provider) = collateral_client();
        let params = collateral_params();
        let txids = client.lock_collateral(&params).await.unwrap();

        let signatures = client
            .multisig_sign_collateral(&txids, &params, CollateralParty::Borrower, "settle-addr")
            .await
            .unwrap();
        let borrower: Vec<String> = signatures
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s.as_str().unwrap().to_owned())
            .collect();

        let txid = client
            .multisig_send_collateral(&txids, &params, &borrower, &borrower, "settle-addr")
            .await
            .unwrap();
        assert!(!txid.is_empty());
    }

    #[tokio::test]
    async fn non_hex_party_signature_is_rejected() {
        let (client, provider) = collateral_client();
        let params = collateral_params();
        let txids = CollateralLockTxids {
            refundable: "aa".repeat(32),
            seizable: "bb".repeat(32),
        };
        let calls_before = provider.calls().len();
        assert!(matches!(
            client
                .multisig_send_collateral(
                    &txids,
                    &params,
                    &["not a signature".to_string()],
                    &[],
                    "settle-addr"
                )
                .await
                .unwrap_err(),
            Error::InvalidArgument { field: "borrower_signatures", .. }
        ));
        assert_eq!(provider.calls().len(), calls_before);
    }
}
