// Provider capability contract.
//
// A provider is a pluggable backend implementing some subset of chain
// operations for one blockchain/wallet integration. Capabilities are an
// explicit descriptor (`capabilities()`) queried at registration and
// resolution time, never inferred structurally, and identity is an explicit
// discriminant tag (`ProviderKind`), never runtime type identity.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::WeakClient;
use crate::types::{CollateralLockTxids, CollateralParameters, CollateralParty, SwapParameters};

/// Generic error type for provider operations. Provider failures propagate
/// to the caller unmodified; the core never reinterprets them.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// Discriminant tag identifying a concrete provider implementation variant.
/// Duplicate detection and requestor-position lookup both key on this tag,
/// so two instances of the same integration share one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProviderKind(pub &'static str);

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The full operation vocabulary plus the two control capabilities.
///
/// `Bind` and `VersionGate` are control hooks: `Bind` must be declared for a
/// provider to be registrable at all, `VersionGate` opts the provider into
/// per-operation version checks at resolution time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    // Control capabilities
    Bind,
    VersionGate,

    // Chain operations
    GenerateBlock,
    GetBlockByHash,
    GetBlockByNumber,
    GetBlockHeight,
    GetTransactionByHash,
    GetBalance,
    SendTransaction,
    SendRawTransaction,

    // Wallet operations
    GetAddresses,
    GetUsedAddresses,
    GetUnusedAddress,
    SignMessage,
    GetWalletInfo,

    // Hash-time-locked swap operations
    CreateSwapScript,
    InitiateSwap,
    VerifyInitiateSwapTransaction,
    ClaimSwap,
    RefundSwap,
    FindInitiateSwapTransaction,
    FindClaimSwapTransaction,
    GetSwapSecret,

    // Collateralized-loan operations
    CreateCollateralScripts,
    LockCollateral,
    RefundCollateral,
    SeizeCollateral,
    ReclaimCollateral,
    MultisigSignCollateral,
    MultisigSendCollateral,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Bind => "bind",
            Method::VersionGate => "version_gate",
            Method::GenerateBlock => "generate_block",
            Method::GetBlockByHash => "get_block_by_hash",
            Method::GetBlockByNumber => "get_block_by_number",
            Method::GetBlockHeight => "get_block_height",
            Method::GetTransactionByHash => "get_transaction_by_hash",
            Method::GetBalance => "get_balance",
            Method::SendTransaction => "send_transaction",
            Method::SendRawTransaction => "send_raw_transaction",
            Method::GetAddresses => "get_addresses",
            Method::GetUsedAddresses => "get_used_addresses",
            Method::GetUnusedAddress => "get_unused_address",
            Method::SignMessage => "sign_message",
            Method::GetWalletInfo => "get_wallet_info",
            Method::CreateSwapScript => "create_swap_script",
            Method::InitiateSwap => "initiate_swap",
            Method::VerifyInitiateSwapTransaction => "verify_initiate_swap_transaction",
            Method::ClaimSwap => "claim_swap",
            Method::RefundSwap => "refund_swap",
            Method::FindInitiateSwapTransaction => "find_initiate_swap_transaction",
            Method::FindClaimSwapTransaction => "find_claim_swap_transaction",
            Method::GetSwapSecret => "get_swap_secret",
            Method::CreateCollateralScripts => "create_collateral_scripts",
            Method::LockCollateral => "lock_collateral",
            Method::RefundCollateral => "refund_collateral",
            Method::SeizeCollateral => "seize_collateral",
            Method::ReclaimCollateral => "reclaim_collateral",
            Method::MultisigSignCollateral => "multisig_sign_collateral",
            Method::MultisigSendCollateral => "multisig_send_collateral",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Default body for an operation the provider declared but did not override.
// Resolution only routes to declared capabilities, so hitting one of these
// means the provider's descriptor and its implementation disagree.
fn not_implemented(kind: ProviderKind, method: Method) -> ProviderError {
    format!("provider `{kind}` declares `{method}` but does not implement it").into()
}

/// Trait defining the capability surface the client consumes from a backend.
///
/// Operations return raw `serde_json::Value`s; the facade is responsible for
/// checking output contracts (schema conformance, hash formats, scalar
/// shapes). Providers only override the operations they list in
/// `capabilities()`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The provider's discriminant tag.
    fn kind(&self) -> ProviderKind;

    /// Explicit capability descriptor: every operation and control hook this
    /// provider exposes. Registration requires `Method::Bind` to be present.
    fn capabilities(&self) -> &[Method];

    /// Accept a non-owning back-reference to the owning client. Invoked once
    /// at registration, only when `Method::Bind` is declared.
    fn bind(&self, client: WeakClient) {
        let _ = client;
    }

    /// Version gate: reports whether `method` is supported under the
    /// client's target version. Only consulted when `Method::VersionGate`
    /// is declared.
    fn supports_method(&self, method: Method, version: &str) -> bool {
        let _ = (method, version);
        true
    }

    // --- Chain operations ---

    async fn generate_block(&self, count: u64) -> Result<Value, ProviderError> {
        let _ = count;
        Err(not_implemented(self.kind(), Method::GenerateBlock))
    }

    async fn get_block_by_hash(
        &self,
        block_hash: &str,
        include_tx: bool,
    ) -> Result<Value, ProviderError> {
        let _ = (block_hash, include_tx);
        Err(not_implemented(self.kind(), Method::GetBlockByHash))
    }

    async fn get_block_by_number(
        &self,
        block_number: u64,
        include_tx: bool,
    ) -> Result<Value, ProviderError> {
        let _ = (block_number, include_tx);
        Err(not_implemented(self.kind(), Method::GetBlockByNumber))
    }

    async fn get_block_height(&self) -> Result<Value, ProviderError> {
        Err(not_implemented(self.kind(), Method::GetBlockHeight))
    }

    async fn get_transaction_by_hash(&self, tx_hash: &str) -> Result<Value, ProviderError> {
        let _ = tx_hash;
        Err(not_implemented(self.kind(), Method::GetTransactionByHash))
    }

    async fn get_balance(&self, addresses: &[String]) -> Result<Value, ProviderError> {
        let _ = addresses;
        Err(not_implemented(self.kind(), Method::GetBalance))
    }

    async fn send_transaction(
        &self,
        to: &str,
        value: u64,
        data: Option<&str>,
    ) -> Result<Value, ProviderError> {
        let _ = (to, value, data);
        Err(not_implemented(self.kind(), Method::SendTransaction))
    }

    async fn send_raw_transaction(&self, raw_tx: &str) -> Result<Value, ProviderError> {
        let _ = raw_tx;
        Err(not_implemented(self.kind(), Method::SendRawTransaction))
    }

    // --- Wallet operations ---

    async fn get_addresses(&self) -> Result<Value, ProviderError> {
        Err(not_implemented(self.kind(), Method::GetAddresses))
    }

    async fn get_used_addresses(&self) -> Result<Value, ProviderError> {
        Err(not_implemented(self.kind(), Method::GetUsedAddresses))
    }

    async fn get_unused_address(&self) -> Result<Value, ProviderError> {
        Err(not_implemented(self.kind(), Method::GetUnusedAddress))
    }

    async fn sign_message(&self, message: &str, from: &str) -> Result<Value, ProviderError> {
        let _ = (message, from);
        Err(not_implemented(self.kind(), Method::SignMessage))
    }

    async fn get_wallet_info(&self) -> Result<Value, ProviderError> {
        Err(not_implemented(self.kind(), Method::GetWalletInfo))
    }

    // --- Hash-time-locked swap operations ---

    async fn create_swap_script(&self, swap: &SwapParameters) -> Result<Value, ProviderError> {
        let _ = swap;
        Err(not_implemented(self.kind(), Method::CreateSwapScript))
    }

    async fn initiate_swap(&self, swap: &SwapParameters) -> Result<Value, ProviderError> {
        let _ = swap;
        Err(not_implemented(self.kind(), Method::InitiateSwap))
    }

    async fn verify_initiate_swap_transaction(
        &self,
        init_tx_hash: &str,
        swap: &SwapParameters,
    ) -> Result<Value, ProviderError> {
        let _ = (init_tx_hash, swap);
        Err(not_implemented(
            self.kind(),
            Method::VerifyInitiateSwapTransaction,
        ))
    }

    async fn claim_swap(
        &self,
        init_tx_hash: &str,
        swap: &SwapParameters,
        secret: &str,
    ) -> Result<Value, ProviderError> {
        let _ = (init_tx_hash, swap, secret);
        Err(not_implemented(self.kind(), Method::ClaimSwap))
    }

    async fn refund_swap(
        &self,
        init_tx_hash: &str,
        swap: &SwapParameters,
    ) -> Result<Value, ProviderError> {
        let _ = (init_tx_hash, swap);
        Err(not_implemented(self.kind(), Method::RefundSwap))
    }

    async fn find_initiate_swap_transaction(
        &self,
        swap: &SwapParameters,
    ) -> Result<Value, ProviderError> {
        let _ = swap;
        Err(not_implemented(
            self.kind(),
            Method::FindInitiateSwapTransaction,
        ))
    }

    async fn find_claim_swap_transaction(
        &self,
        init_tx_hash: &str,
        swap: &SwapParameters,
    ) -> Result<Value, ProviderError> {
        let _ = (init_tx_hash, swap);
        Err(not_implemented(
            self.kind(),
            Method::FindClaimSwapTransaction,
        ))
    }

    async fn get_swap_secret(&self, claim_tx_hash: &str) -> Result<Value, ProviderError> {
        let _ = claim_tx_hash;
        Err(not_implemented(self.kind(), Method::GetSwapSecret))
    }

    // --- Collateralized-loan operations ---

    async fn create_collateral_scripts(
        &self,
        collateral: &CollateralParameters,
    ) -> Result<Value, ProviderError> {
        let _ = collateral;
        Err(not_implemented(self.kind(), Method::CreateCollateralScripts))
    }

    async fn lock_collateral(
        &self,
        collateral: &CollateralParameters,
    ) -> Result<Value, ProviderError> {
        let _ = collateral;
        Err(not_implemented(self.kind(), Method::LockCollateral))
    }

    async fn refund_collateral(
        &self,
        lock_txids: &CollateralLockTxids,
        collateral: &CollateralParameters,
        secret_b2: &str,
    ) -> Result<Value, ProviderError> {
        let _ = (lock_txids, collateral, secret_b2);
        Err(not_implemented(self.kind(), Method::RefundCollateral))
    }

    async fn seize_collateral(
        &self,
        seizable_tx_hash: &str,
        collateral: &CollateralParameters,
        secret_a1: &str,
    ) -> Result<Value, ProviderError> {
        let _ = (seizable_tx_hash, collateral, secret_a1);
        Err(not_implemented(self.kind(), Method::SeizeCollateral))
    }

    async fn reclaim_collateral(
        &self,
        refundable_tx_hash: &str,
        collateral: &CollateralParameters,
    ) -> Result<Value, ProviderError> {
        let _ = (refundable_tx_hash, collateral);
        Err(not_implemented(self.kind(), Method::ReclaimCollateral))
    }

    async fn multisig_sign_collateral(
        &self,
        lock_txids: &CollateralLockTxids,
        collateral: &CollateralParameters,
        party: CollateralParty,
        to: &str,
    ) -> Result<Value, ProviderError> {
        let _ = (lock_txids, collateral, party, to);
        Err(not_implemented(self.kind(), Method::MultisigSignCollateral))
    }

    async fn multisig_send_collateral(
        &self,
        lock_txids: &CollateralLockTxids,
        collateral: &CollateralParameters,
        borrower_signatures: &[String],
        lender_signatures: &[String],
        to: &str,
    ) -> Result<Value, ProviderError> {
        let _ = (lock_txids, collateral, borrower_signatures, lender_signatures, to);
        Err(not_implemented(self.kind(), Method::MultisigSendCollateral))
    }
}

impl fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Provider").field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    #[async_trait]
    impl Provider for Bare {
        fn kind(&self) -> ProviderKind {
            ProviderKind("bare")
        }
        fn capabilities(&self) -> &[Method] {
            &[Method::Bind, Method::GetBlockHeight]
        }
    }

    #[test]
    fn method_names_are_stable() {
        assert_eq!(Method::GetBlockByHash.to_string(), "get_block_by_hash");
        assert_eq!(Method::MultisigSendCollateral.name(), "multisig_send_collateral");
        assert_eq!(Method::Bind.name(), "bind");
    }

    #[tokio::test]
    async fn default_bodies_report_the_missing_override() {
        let p = Bare;
        let err = p.get_block_height().await.unwrap_err();
        assert!(err.to_string().contains("bare"));
        assert!(err.to_string().contains("get_block_height"));
    }

    #[test]
    fn version_gate_defaults_to_supported() {
        let p = Bare;
        assert!(p.supports_method(Method::GetBlockHeight, "0.9.0"));
    }
}
