//! Error types for the call orchestrator.
//!
//! Every failure a call can end in is a [`ClientError`]; the
//! [`TerminalState`] it maps to is what callers and the CLI report.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tollgate_ledger::LedgerError;
use tollgate_types::{ChainNamespace, UsdAmount};
use tollgate_x402::X402Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Maximum number of body characters kept in error messages.
pub const BODY_SNIPPET_CHARS: usize = 500;

/// Final state of one orchestrated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalState {
    /// First attempt succeeded without payment.
    FreeOk,
    /// Paid retry succeeded.
    PaidOk,
    /// Daily budget would be exceeded.
    BudgetRejected,
    /// Price exceeds the per-call limit.
    PerCallRejected,
    /// First attempt returned a non-402 error status.
    RemoteError,
    /// Paid retry returned an error status.
    PaidFailed,
    /// 402 without usable payment requirements.
    NoObligation,
    /// 402 with a missing or unusable price.
    InvalidAmount,
    /// No wallet for the obligation's chain.
    SigningUnavailable,
    /// The wallet failed to produce a signature.
    SigningFailed,
    /// Network failure after all retries.
    TransportFailed,
    /// The request could not be built.
    InvalidRequest,
}

impl TerminalState {
    /// Upper snake case name, as used in envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreeOk => "FREE_OK",
            Self::PaidOk => "PAID_OK",
            Self::BudgetRejected => "BUDGET_REJECTED",
            Self::PerCallRejected => "PER_CALL_REJECTED",
            Self::RemoteError => "REMOTE_ERROR",
            Self::PaidFailed => "PAID_FAILED",
            Self::NoObligation => "NO_OBLIGATION",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::SigningUnavailable => "SIGNING_UNAVAILABLE",
            Self::SigningFailed => "SIGNING_FAILED",
            Self::TransportFailed => "TRANSPORT_FAILED",
            Self::InvalidRequest => "INVALID_REQUEST",
        }
    }

    /// Whether the call succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::FreeOk | Self::PaidOk)
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can end an orchestrated call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or timeout failure on every attempt.
    #[error("Request to {url} failed after {attempts} attempt(s): {reason}")]
    Transport {
        /// Attempts made.
        attempts: u32,
        /// Target URL.
        url: String,
        /// Last failure.
        reason: String,
    },

    /// The remote answered with a non-success status.
    #[error("{}", remote_message(.context, .status, .status_text, .url, .body))]
    Remote {
        /// What was being attempted.
        context: String,
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase.
        status_text: String,
        /// Final URL.
        url: String,
        /// First characters of the response body.
        body: String,
    },

    /// 402 without usable payment requirements.
    #[error("402 response missing payment requirements in body")]
    NoObligation,

    /// 402 with an unusable price.
    #[error("Invalid or missing payment amount in 402 requirements")]
    InvalidAmount {
        /// Raw amount as received.
        raw: Option<String>,
    },

    /// The price exceeds the per-call limit.
    #[error("Price {price} exceeds per-call budget limit of {limit}")]
    PerCallLimitExceeded {
        /// Price of the call.
        price: UsdAmount,
        /// Configured per-call limit.
        limit: UsdAmount,
    },

    /// The daily budget would be exceeded.
    #[error(transparent)]
    Budget(#[from] LedgerError),

    /// No wallet is configured for the obligation's chain.
    #[error("{namespace} wallet not configured for this payment")]
    SigningUnavailable {
        /// Namespace that needed a wallet.
        namespace: ChainNamespace,
    },

    /// The wallet failed to sign.
    #[error("{namespace} wallet failed to sign payment: {reason}")]
    SigningFailed {
        /// Namespace of the wallet.
        namespace: ChainNamespace,
        /// Failure description.
        reason: String,
    },

    /// The paid retry was rejected.
    #[error("Payment failed: {status} - {body}")]
    PaymentFailed {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

fn remote_message(context: &str, status: &u16, status_text: &str, url: &str, body: &str) -> String {
    let mut parts = vec![context.to_string(), format!("status={}", status)];
    if !status_text.is_empty() {
        parts.push(format!("statusText={}", status_text));
    }
    if !url.is_empty() {
        parts.push(format!("url={}", url));
    }
    if !body.is_empty() {
        parts.push(format!("body={}", body));
    }
    parts.join(" | ")
}

impl ClientError {
    /// Create a transport error for a single attempt.
    pub fn transport(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            attempts: 1,
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }

    /// Record how many attempts a transport error took.
    pub fn with_attempts(self, attempts: u32) -> Self {
        match self {
            Self::Transport { url, reason, .. } => Self::Transport {
                attempts,
                url,
                reason,
            },
            other => other,
        }
    }

    /// Only network and timeout failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// The terminal state this error ends a call in.
    pub fn terminal_state(&self) -> TerminalState {
        match self {
            Self::Transport { .. } => TerminalState::TransportFailed,
            Self::Remote { .. } => TerminalState::RemoteError,
            Self::NoObligation => TerminalState::NoObligation,
            Self::InvalidAmount { .. } => TerminalState::InvalidAmount,
            Self::PerCallLimitExceeded { .. } => TerminalState::PerCallRejected,
            Self::Budget(_) => TerminalState::BudgetRejected,
            Self::SigningUnavailable { .. } => TerminalState::SigningUnavailable,
            Self::SigningFailed { .. } => TerminalState::SigningFailed,
            Self::PaymentFailed { .. } => TerminalState::PaidFailed,
            Self::InvalidRequest(_) => TerminalState::InvalidRequest,
        }
    }

    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::Transport { .. } => "Check network connectivity and the API base URL",
            Self::Remote { status, .. } if *status == 401 || *status == 403 => {
                "Check the credentials passed with -H"
            }
            Self::Remote { status, .. } if *status == 404 => "Check the endpoint path",
            Self::Remote { .. } => "The API returned an error; see the body for details",
            Self::NoObligation | Self::InvalidAmount { .. } => {
                "The endpoint advertised an unusable payment; contact the API owner"
            }
            Self::PerCallLimitExceeded { .. } => {
                "Raise budget.per_call_usd if this price is expected"
            }
            Self::Budget(e) => e.suggestion(),
            Self::SigningUnavailable { .. } => {
                "Configure a signer for this chain under [wallets.<namespace>]"
            }
            Self::SigningFailed { .. } => "Check that the signer service is running and funded",
            Self::PaymentFailed { .. } => "The payment was rejected; the debit was kept",
            Self::InvalidRequest(_) => "Check the method, endpoint and headers",
        }
    }
}

impl From<X402Error> for ClientError {
    fn from(e: X402Error) -> Self {
        match e {
            X402Error::NoObligation => Self::NoObligation,
            X402Error::InvalidAmount { raw } => Self::InvalidAmount { raw },
        }
    }
}

/// Truncate a body to [`BODY_SNIPPET_CHARS`] characters.
pub fn body_snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}
