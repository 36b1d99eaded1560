// Wallet operations facade.
//
// Address listing, signing, and wallet info have no applicable output
// schema; their results pass through unchecked beyond basic presence.

use serde_json::Value;

use crate::client::{expect_present, Client};
use crate::error::Error;
use crate::provider::Method;

impl Client {
    /// All addresses managed by the wallet provider, in derivation order.
    pub async fn get_addresses(&self) -> Result<Value, Error> {
        let provider = self.resolve_provider(Method::GetAddresses, None)?;
        let addresses = provider.get_addresses().await?;
        expect_present(addresses, "addresses")
    }

    /// Addresses that have appeared in at least one transaction.
    pub async fn get_used_addresses(&self) -> Result<Value, Error> {
        let provider = self.resolve_provider(Method::GetUsedAddresses, None)?;
        let addresses = provider.get_used_addresses().await?;
        expect_present(addresses, "addresses")
    }

    /// A fresh, never-used receive address.
    pub async fn get_unused_address(&self) -> Result<Value, Error> {
        let provider = self.resolve_provider(Method::GetUnusedAddress, None)?;
        let address = provider.get_unused_address().await?;
        expect_present(address, "address")
    }

    /// Signs `message` with the key behind `from`. The signature encoding
    /// is provider-specific and passes through unchecked.
    pub async fn sign_message(&self, message: &str, from: &str) -> Result<Value, Error> {
        let provider = self.resolve_provider(Method::SignMessage, None)?;
        let signature = provider.sign_message(message, from).await?;
        expect_present(signature, "signature")
    }

    /// Provider-specific wallet metadata (balance summaries, readiness).
    pub async fn get_wallet_info(&self) -> Result<Value, Error> {
        let provider = self.resolve_provider(Method::GetWalletInfo, None)?;
        let info = provider.get_wallet_info().await?;
        expect_present(info, "wallet_info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::SigningWalletProvider;

    #[tokio::test]
    async fn wallet_results_pass_through() {
        let client = Client::new("1.0.0");
        client.register(SigningWalletProvider::from_seed(7)).unwrap();

        let addresses = client.get_addresses().await.unwrap();
        let first = addresses[0]["address"].as_str().unwrap().to_owned();
        assert!(!first.is_empty());

        let signature = client.sign_message("hello", &first).await.unwrap();
        assert!(signature.as_str().unwrap().chars().all(|c| c.is_ascii_hexdigit()));

        let unused = client.get_unused_address().await.unwrap();
        assert_eq!(unused["address"].as_str().unwrap(), first);
    }

    #[tokio::test]
    async fn missing_wallet_capability_is_unimplemented() {
        let client = Client::new("1.0.0");
        client.register(crate::test_utils::MockChainProvider::new()).unwrap();
        match client.get_wallet_info().await.unwrap_err() {
            Error::UnimplementedMethod(method) => assert_eq!(method, Method::GetWalletInfo),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
