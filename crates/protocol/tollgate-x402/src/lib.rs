//! x402 Payment Required negotiation for Tollgate.
//!
//! When a marketplace endpoint answers `402 Payment Required`, its body
//! lists the payments the server will accept. This crate reads that body
//! and picks one obligation to pay. It never signs and never talks to the
//! network; signing is delegated to a wallet by the caller.
//!
//! ```text
//!   402 body ──► parse_payment_required ──► PaymentRequired { accepts }
//!                                                │
//!                 preferred namespace ──► select_obligation
//!                                                │
//!                                                ▼
//!                                     PaymentObligation { amount, namespace }
//! ```
//!
//! # Components
//!
//! - **[`types`]**: 402 body and obligation types
//! - **[`negotiate`]**: parsing and obligation selection
//! - **[`error`]**: Error types with recovery suggestions
//!
//! # Usage
//!
//! ```rust
//! use tollgate_types::ChainNamespace;
//! use tollgate_x402::{parse_payment_required, select_obligation};
//!
//! let body = br#"{"accepts":[{"scheme":"exact","network":"solana:devnet","amount":"10000","payTo":"abc"}]}"#;
//! let required = parse_payment_required(body);
//! let obligation = select_obligation(&required, &ChainNamespace::solana()).unwrap();
//!
//! assert_eq!(obligation.amount_minor_units, 10_000);
//! assert_eq!(obligation.price_usd().to_string(), "$0.01");
//! ```
//!
//! # Amounts
//!
//! Amounts are read from `amount` (v2) or `maxAmountRequired` (v1) and
//! always interpreted with 6 decimal places. An asset declaring other
//! decimals in `extra.decimals` is logged but not rescaled.

pub mod error;
pub mod negotiate;
pub mod types;

pub use error::{X402Error, X402Result};
pub use negotiate::{
    parse_amount, parse_payment_required, payment_required_from_value, select_obligation,
    select_requirement,
};
pub use types::{
    PaymentObligation, PaymentRequired, PaymentRequirement, ASSUMED_ASSET_DECIMALS,
    HEADER_PAYMENT_SIGNATURE, MINOR_UNITS_PER_USD,
};
