// Parameter shapes shared by the swap and collateral protocol surfaces.
//
// These structs are plain data carried between the caller, the facade, and
// the provider that ultimately executes an operation. The facade validates
// their format contracts (hexadecimal commitments, escalating deadlines)
// before any dispatch; the structs themselves hold the per-field checks.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::schema::ensure_hex;

/// Describes a hash-and-time-locked exchange: funds move to the recipient on
/// revelation of the secret behind `secret_hash`, or back to the refund
/// address once `expiration` has elapsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParameters {
    pub value: u64,
    pub recipient_address: String,
    pub refund_address: String,
    /// One-way commitment to the claim secret, as a hexadecimal string.
    pub secret_hash: String,
    /// Time bound after which refund becomes valid. Absolute or relative;
    /// interpretation belongs to the executing provider.
    pub expiration: u64,
}

impl SwapParameters {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        ensure_hex("secret_hash", &self.secret_hash)
    }
}

/// Which side of a collateralized loan is acting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollateralParty {
    Borrower,
    Lender,
}

/// The two collateral pools backing a loan. The refundable pool returns to
/// the borrower on repayment; the seizable pool is forfeit to the lender on
/// default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralValues {
    pub refundable: u64,
    pub seizable: u64,
}

/// Compressed public keys (hexadecimal) for the two parties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyKeys {
    pub borrower_pub_key: String,
    pub lender_pub_key: String,
}

impl PartyKeys {
    fn validate(&self) -> Result<(), Error> {
        ensure_hex("borrower_pub_key", &self.borrower_pub_key)?;
        ensure_hex("lender_pub_key", &self.lender_pub_key)
    }
}

/// Hash-locks guarding the collateral pools: A1/A2 are borrower-side
/// commitments, B2/B3 lender-side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretHashes {
    pub a1: String,
    pub a2: String,
    pub b2: String,
    pub b3: String,
}

impl SecretHashes {
    fn validate(&self) -> Result<(), Error> {
        ensure_hex("secret_hash_a1", &self.a1)?;
        ensure_hex("secret_hash_a2", &self.a2)?;
        ensure_hex("secret_hash_b2", &self.b2)?;
        ensure_hex("secret_hash_b3", &self.b3)
    }
}

/// Three escalating deadlines describing the staged dispute-resolution
/// window: normal repayment until `loan`, dispute/negotiation until
/// `bidding`, then unilateral seizure becomes valid after `seizure`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expirations {
    pub loan: u64,
    pub bidding: u64,
    pub seizure: u64,
}

impl Expirations {
    fn validate(&self) -> Result<(), Error> {
        if self.loan < self.bidding && self.bidding < self.seizure {
            Ok(())
        } else {
            Err(Error::invalid_argument(
                "expirations",
                format!(
                    "deadlines must escalate: loan {} < bidding {} < seizure {}",
                    self.loan, self.bidding, self.seizure
                ),
            ))
        }
    }
}

/// Full description of a collateralized loan's escrow arrangement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralParameters {
    pub values: CollateralValues,
    pub keys: PartyKeys,
    pub secret_hashes: SecretHashes,
    pub expirations: Expirations,
}

impl CollateralParameters {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        self.keys.validate()?;
        self.secret_hashes.validate()?;
        self.expirations.validate()
    }
}

/// Transaction ids of the two lock transactions produced by
/// `lock_collateral`, one per pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralLockTxids {
    pub refundable: String,
    pub seizable: String,
}

impl CollateralLockTxids {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        ensure_hex("refundable_tx_hash", &self.refundable)?;
        ensure_hex("seizable_tx_hash", &self.seizable)
    }
}
