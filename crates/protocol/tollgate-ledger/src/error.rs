//! Error types for the spend ledger.

use thiserror::Error;
use tollgate_types::UsdAmount;

/// Result type alias for ledger operations.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in the spend ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// I/O error reading or writing the state file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state file held invalid JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The debit would push today's total past the daily limit.
    #[error(
        "Price ${:.4} would exceed daily budget of {limit} (already spent: ${:.4})",
        .attempted.as_usd(),
        .spent.as_usd()
    )]
    BudgetExceeded {
        /// Price of the rejected call.
        attempted: UsdAmount,
        /// Amount already spent today.
        spent: UsdAmount,
        /// Configured daily limit.
        limit: UsdAmount,
    },

    /// Lock poisoning error.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl LedgerError {
    /// Whether this error is a budget rejection rather than a storage fault.
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, Self::BudgetExceeded { .. })
    }

    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::BudgetExceeded { .. } => {
                "Wait for the daily budget to reset at UTC midnight or raise budget.daily_usd"
            }
            Self::Io(_) => "Check permissions on the budget state file",
            Self::Serialization(_) => "The budget state file is corrupt; it will be reset",
            Self::LockPoisoned(_) => "This is an internal error; please report it",
        }
    }
}
