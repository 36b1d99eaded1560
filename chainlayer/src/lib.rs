// chainlayer: a chain-abstraction client.
//
// One facade (`Client`) exposes a uniform set of blockchain operations while
// the network work is delegated to pluggable, chain-specific providers. The
// crate's core is the method-resolution engine (which registered provider
// executes a given call) and the swap/collateral protocol sequencers layered
// on top of it.

pub mod client;
pub mod error;
pub mod provider;
pub mod schema;
pub mod types;

// Operation facade, grouped by surface. These modules only add inherent
// impls on `Client`.
pub mod chain;
pub mod collateral;
pub mod swap;
pub mod wallet;

pub mod test_utils; // Shared mock providers for unit and integration tests.

pub use client::{Client, WeakClient};
pub use error::Error;
pub use provider::{Method, Provider, ProviderError, ProviderKind};
pub use schema::{FieldKind, FieldRule, Schema, SchemaValidator, Violation};
pub use types::{
    CollateralLockTxids, CollateralParameters, CollateralParty, CollateralValues, Expirations,
    PartyKeys, SecretHashes, SwapParameters,
};
