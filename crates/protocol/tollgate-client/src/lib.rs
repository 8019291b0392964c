//! Budget-constrained, payment-gated HTTP calls for Tollgate.
//!
//! [`CallOrchestrator`] calls a marketplace endpoint, and when it answers
//! `402 Payment Required` it picks a payment obligation, checks it
//! against the per-call and daily limits, asks a [`Wallet`] for a
//! signature and retries once with the `payment-signature` header.
//!
//! # Components
//!
//! - **[`transport`]**: HTTP with per-attempt timeout and fixed-delay retries
//! - **[`orchestrator`]**: The call state machine
//! - **[`wallet`]**: Wallet capability and registry
//! - **[`signer`]**: Wallet backed by a remote signer service
//! - **[`envelope`]**: `{ok, data | error, meta}` result envelope
//! - **[`error`]**: Error types and terminal states
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tollgate_client::{
//!     CallEnvelope, CallOrchestrator, CallRequest, ClientConfig, HttpSignerWallet, WalletRegistry,
//! };
//! use tollgate_ledger::SpendLedger;
//! use tollgate_types::ChainNamespace;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let signer = HttpSignerWallet::new(ChainNamespace::solana(), "http://127.0.0.1:7402")?;
//! let wallets = WalletRegistry::new().with_wallet(Arc::new(signer));
//! let ledger = Arc::new(SpendLedger::with_file(tollgate_ledger::default_state_path()));
//!
//! let orchestrator = CallOrchestrator::new(ClientConfig::default(), ledger, wallets)?;
//! let result = orchestrator.call(CallRequest::new("joe/weather")).await;
//! println!("{}", CallEnvelope::from(result).to_json_pretty());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod signer;
pub mod transport;
pub mod wallet;

pub use config::{ClientConfig, TransportConfig, DEFAULT_API_BASE, DEFAULT_LINK_PREFIX};
pub use envelope::{CallEnvelope, EnvelopeError};
pub use error::{ClientError, ClientResult, TerminalState};
pub use orchestrator::{CallOrchestrator, CallRequest, CallSuccess, PaymentReceipt, FREE_NOTE};
pub use retry::RetryPolicy;
pub use signer::HttpSignerWallet;
pub use transport::{assert_ok, HttpMethod, HttpRequest, HttpResponse, Transport};
pub use wallet::{PaymentContext, Wallet, WalletRegistry};
