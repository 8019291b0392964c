//! Storage back-ends for the spend record.
//!
//! The ledger reads and writes a single [`SpendRecord`] through the
//! [`SpendStore`] trait. Implementations may vary (file on disk or in
//! memory) but must satisfy this interface.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::record::SpendRecord;

// =============================================================================
// Store Trait
// =============================================================================

/// Durable storage for the current spend record.
pub trait SpendStore: Send + Sync {
    /// Load the stored record.
    ///
    /// Returns `None` if nothing has been stored yet.
    fn load(&self) -> LedgerResult<Option<SpendRecord>>;

    /// Replace the stored record.
    fn save(&self, record: &SpendRecord) -> LedgerResult<()>;
}

// =============================================================================
// File Store
// =============================================================================

/// Spend record kept as a small JSON file.
///
/// The file is not locked; two processes sharing one file can race.
#[derive(Debug, Clone)]
pub struct FileSpendStore {
    path: PathBuf,
}

impl FileSpendStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SpendStore for FileSpendStore {
    fn load(&self) -> LedgerResult<Option<SpendRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_slice(&bytes)?;
        Ok(Some(record))
    }

    fn save(&self, record: &SpendRecord) -> LedgerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(record)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "Saved spend record");
        Ok(())
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-memory spend record, for tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemorySpendStore {
    record: Mutex<Option<SpendRecord>>,
}

impl MemorySpendStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `record`.
    pub fn with_record(record: SpendRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl SpendStore for MemorySpendStore {
    fn load(&self) -> LedgerResult<Option<SpendRecord>> {
        let record = self
            .record
            .lock()
            .map_err(|e| LedgerError::LockPoisoned(e.to_string()))?;
        Ok(*record)
    }

    fn save(&self, record: &SpendRecord) -> LedgerResult<()> {
        let mut slot = self
            .record
            .lock()
            .map_err(|e| LedgerError::LockPoisoned(e.to_string()))?;
        *slot = Some(*record);
        Ok(())
    }
}
