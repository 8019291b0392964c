//! Wallet capability.
//!
//! The orchestrator never signs. It hands the chosen obligation and the
//! 402 context to a [`Wallet`] registered for the obligation's chain
//! namespace and attaches whatever token comes back.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tollgate_types::ChainNamespace;
use tollgate_x402::PaymentObligation;

use crate::error::ClientResult;
use crate::transport::HttpMethod;

/// What the server said when it asked for payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentContext {
    /// URL that answered 402.
    pub url: String,
    /// Method of the original request.
    pub method: HttpMethod,
    /// Headers of the 402 response.
    pub headers: Vec<(String, String)>,
    /// Parsed 402 body, `null` when it was not JSON.
    pub body: Value,
}

/// Something that can produce payment proofs for one chain namespace.
///
/// Implementations return [`ClientError::SigningFailed`](crate::ClientError::SigningFailed)
/// when they cannot sign.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Namespace this wallet signs for.
    fn namespace(&self) -> ChainNamespace;

    /// Short human-readable description (address, signer URL).
    fn describe(&self) -> String {
        format!("{} wallet", self.namespace())
    }

    /// Produce the `payment-signature` header value for `obligation`.
    async fn sign(
        &self,
        obligation: &PaymentObligation,
        context: &PaymentContext,
    ) -> ClientResult<String>;
}

/// Wallets keyed by chain namespace.
#[derive(Clone, Default)]
pub struct WalletRegistry {
    wallets: HashMap<ChainNamespace, Arc<dyn Wallet>>,
}

impl fmt::Debug for WalletRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRegistry")
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

impl WalletRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a wallet, builder style.
    pub fn with_wallet(mut self, wallet: Arc<dyn Wallet>) -> Self {
        self.register(wallet);
        self
    }

    /// Add a wallet, replacing any wallet for the same namespace.
    pub fn register(&mut self, wallet: Arc<dyn Wallet>) {
        self.wallets.insert(wallet.namespace(), wallet);
    }

    /// Wallet for `namespace`, if any.
    pub fn get(&self, namespace: &ChainNamespace) -> Option<Arc<dyn Wallet>> {
        self.wallets.get(namespace).cloned()
    }

    /// Whether no wallet is registered.
    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Number of registered wallets.
    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    /// Registered namespaces, sorted.
    pub fn namespaces(&self) -> Vec<ChainNamespace> {
        let mut namespaces: Vec<_> = self.wallets.keys().cloned().collect();
        namespaces.sort();
        namespaces
    }

    /// Registered wallets, sorted by namespace.
    pub fn wallets(&self) -> Vec<Arc<dyn Wallet>> {
        self.namespaces()
            .iter()
            .filter_map(|ns| self.get(ns))
            .collect()
    }

    /// Namespace to prefer when choosing among payment options.
    ///
    /// With exactly one wallet its namespace wins; otherwise the
    /// configured preference applies.
    pub fn preferred_namespace(&self, configured: &ChainNamespace) -> ChainNamespace {
        match self.namespaces().as_slice() {
            [only] => only.clone(),
            _ => configured.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    struct FixedWallet(ChainNamespace);

    #[async_trait]
    impl Wallet for FixedWallet {
        fn namespace(&self) -> ChainNamespace {
            self.0.clone()
        }

        async fn sign(&self, _: &PaymentObligation, _: &PaymentContext) -> ClientResult<String> {
            Err(ClientError::SigningFailed {
                namespace: self.0.clone(),
                reason: "fixed".into(),
            })
        }
    }

    #[test]
    fn test_registry_lookup() {
        let registry = WalletRegistry::new()
            .with_wallet(Arc::new(FixedWallet(ChainNamespace::solana())))
            .with_wallet(Arc::new(FixedWallet(ChainNamespace::eip155())));

        assert_eq!(registry.len(), 2);
        assert!(registry.get(&ChainNamespace::solana()).is_some());
        assert!(registry.get(&ChainNamespace::from_network("aptos")).is_none());
        assert_eq!(
            registry.namespaces(),
            vec![ChainNamespace::eip155(), ChainNamespace::solana()]
        );
    }

    #[test]
    fn test_preferred_namespace() {
        let configured = ChainNamespace::solana();

        let empty = WalletRegistry::new();
        assert_eq!(empty.preferred_namespace(&configured), configured);

        let evm_only =
            WalletRegistry::new().with_wallet(Arc::new(FixedWallet(ChainNamespace::eip155())));
        assert_eq!(
            evm_only.preferred_namespace(&configured),
            ChainNamespace::eip155()
        );

        let both = evm_only.with_wallet(Arc::new(FixedWallet(ChainNamespace::solana())));
        assert_eq!(both.preferred_namespace(&ChainNamespace::eip155()), ChainNamespace::eip155());
        assert_eq!(both.preferred_namespace(&configured), configured);
    }

    #[test]
    fn test_default_describe() {
        assert_eq!(
            FixedWallet(ChainNamespace::solana()).describe(),
            "solana wallet"
        );
    }
}
