//! Shared data types for Tollgate.
//!
//! This crate holds the small value types every other Tollgate crate
//! agrees on. It contains no I/O and no business logic.
//!
//! # Module Organization
//!
//! - [`amount`] - USD amounts in integer micro-dollars
//! - [`policy`] - Per-call and daily spending limits
//! - [`network`] - Chain namespaces derived from x402 network identifiers
//! - [`error`] - Validation errors for the types above
//!
//! # Example
//!
//! ```
//! use tollgate_types::{BudgetPolicy, ChainNamespace, UsdAmount};
//!
//! let policy = BudgetPolicy::from_usd(1.0, 50.0).unwrap();
//! let price = UsdAmount::from_micros(10_000);
//!
//! assert!(policy.allows_per_call(price));
//! assert_eq!(price.to_string(), "$0.01");
//! assert_eq!(ChainNamespace::from_network("solana:devnet"), ChainNamespace::solana());
//! ```

/// Crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod amount;
pub mod error;
pub mod network;
pub mod policy;

pub use amount::{UsdAmount, MICROS_PER_USD};
pub use error::{TypesError, TypesResult};
pub use network::ChainNamespace;
pub use policy::BudgetPolicy;
