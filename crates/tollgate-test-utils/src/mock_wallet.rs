//! Mock implementation of the `Wallet` trait for testing.
//!
//! Records every sign request and returns a fixed token, or fails on
//! demand.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tollgate_client::{ClientError, ClientResult, PaymentContext, Wallet};
use tollgate_types::ChainNamespace;
use tollgate_x402::PaymentObligation;

/// One recorded sign request.
#[derive(Debug, Clone)]
pub struct SignCall {
    /// Obligation the wallet was asked to pay.
    pub obligation: PaymentObligation,
    /// Context passed along with it.
    pub context: PaymentContext,
}

struct MockWalletInner {
    /// Token returned from `sign`.
    token: String,
    /// When true, `sign` returns SigningFailed.
    should_fail: bool,
    /// Every sign request, in order.
    calls: Vec<SignCall>,
}

/// A mock wallet for one chain namespace.
///
/// Uses `Arc<RwLock<...>>` internally, so it is cheap to clone and
/// all clones share the same state.
#[derive(Clone)]
pub struct MockWallet {
    namespace: ChainNamespace,
    inner: Arc<RwLock<MockWalletInner>>,
}

impl MockWallet {
    /// Create a mock wallet that signs with `"SIG"`.
    pub fn new(namespace: ChainNamespace) -> Self {
        Self {
            namespace,
            inner: Arc::new(RwLock::new(MockWalletInner {
                token: "SIG".to_string(),
                should_fail: false,
                calls: Vec::new(),
            })),
        }
    }

    /// A Solana mock wallet.
    pub fn solana() -> Self {
        Self::new(ChainNamespace::solana())
    }

    /// An EVM mock wallet.
    pub fn evm() -> Self {
        Self::new(ChainNamespace::eip155())
    }

    /// Set the token returned from `sign`.
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.inner.write().unwrap().token = token.into();
        self
    }

    /// Configure the mock to fail every sign request.
    pub fn with_failure(self) -> Self {
        self.inner.write().unwrap().should_fail = true;
        self
    }

    /// Set the failure mode at runtime.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.inner.write().unwrap().should_fail = should_fail;
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    /// All recorded sign requests.
    pub fn calls(&self) -> Vec<SignCall> {
        self.inner.read().unwrap().calls.clone()
    }

    /// Number of sign requests.
    pub fn call_count(&self) -> usize {
        self.inner.read().unwrap().calls.len()
    }

    /// The most recent sign request.
    pub fn last_call(&self) -> Option<SignCall> {
        self.inner.read().unwrap().calls.last().cloned()
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn namespace(&self) -> ChainNamespace {
        self.namespace.clone()
    }

    fn describe(&self) -> String {
        format!("mock {} wallet", self.namespace)
    }

    async fn sign(
        &self,
        obligation: &PaymentObligation,
        context: &PaymentContext,
    ) -> ClientResult<String> {
        let mut inner = self.inner.write().unwrap();
        inner.calls.push(SignCall {
            obligation: obligation.clone(),
            context: context.clone(),
        });
        if inner.should_fail {
            return Err(ClientError::SigningFailed {
                namespace: self.namespace.clone(),
                reason: "mock failure".to_string(),
            });
        }
        Ok(inner.token.clone())
    }
}
