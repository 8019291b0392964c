//! Persistent daily spend ledger for Tollgate.
//!
//! Keeps one [`SpendRecord`] per UTC day and refuses debits that would
//! push the day's total past the configured limit.
//!
//! # Module Organization
//!
//! - [`ledger`] - Check-and-record, status and refunds
//! - [`store`] - Storage trait with file and in-memory back-ends
//! - [`record`] - The persisted record
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```
//! use tollgate_ledger::SpendLedger;
//! use tollgate_types::{BudgetPolicy, UsdAmount};
//!
//! let ledger = SpendLedger::in_memory();
//! let policy = BudgetPolicy::from_usd(1.0, 0.02).unwrap();
//!
//! ledger.check_and_record(&policy, UsdAmount::from_micros(10_000)).unwrap();
//! ledger.check_and_record(&policy, UsdAmount::from_micros(10_000)).unwrap();
//! assert!(ledger.check_and_record(&policy, UsdAmount::from_micros(10_000)).is_err());
//! ```

use std::path::PathBuf;

pub mod error;
pub mod ledger;
pub mod record;
pub mod store;

pub use error::{LedgerError, LedgerResult};
pub use ledger::{BudgetStatus, SpendLedger};
pub use record::SpendRecord;
pub use store::{FileSpendStore, MemorySpendStore, SpendStore};

/// Environment variable overriding the state file location.
pub const STATE_FILE_ENV: &str = "TOLLGATE_BUDGET_STATE_FILE";

/// File name of the state file inside the data directory.
pub const STATE_FILE_NAME: &str = "budget.json";

/// Get the default state file path.
///
/// Uses `TOLLGATE_BUDGET_STATE_FILE` if set and non-blank, otherwise
/// `budget.json` in the platform data directory (`~/.tollgate` as a last
/// resort).
pub fn default_state_path() -> PathBuf {
    if let Ok(path) = std::env::var(STATE_FILE_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    default_data_dir().join(STATE_FILE_NAME)
}

/// Get the default data directory.
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("io", "tollgate", "tollgate")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".tollgate")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_path_file_name() {
        // only meaningful when the override is unset
        if std::env::var(STATE_FILE_ENV).is_err() {
            assert!(default_state_path().ends_with(STATE_FILE_NAME));
        }
    }
}
