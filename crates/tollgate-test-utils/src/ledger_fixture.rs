//! File-backed ledger in a temporary directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tollgate_ledger::{FileSpendStore, SpendLedger, SpendRecord, SpendStore};
use tollgate_types::UsdAmount;

/// A [`SpendLedger`] over a JSON file that is removed on drop.
pub struct LedgerFixture {
    _dir: TempDir,
    path: PathBuf,
    ledger: Arc<SpendLedger>,
}

impl LedgerFixture {
    /// Create an empty ledger file location.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("budget.json");
        let ledger = Arc::new(SpendLedger::with_file(&path));
        Self {
            _dir: dir,
            path,
            ledger,
        }
    }

    /// The shared ledger.
    pub fn ledger(&self) -> Arc<SpendLedger> {
        Arc::clone(&self.ledger)
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store `spent` as today's total.
    pub fn seed_today(&self, spent: UsdAmount) {
        self.write_record(SpendRecord::new(SpendLedger::today(), spent));
    }

    /// Store `spent` as yesterday's total.
    pub fn seed_yesterday(&self, spent: UsdAmount) {
        let yesterday = SpendLedger::today()
            .pred_opt()
            .expect("today has a previous day");
        self.write_record(SpendRecord::new(yesterday, spent));
    }

    /// Write a record directly.
    pub fn write_record(&self, record: SpendRecord) {
        FileSpendStore::new(&self.path)
            .save(&record)
            .expect("write spend record");
    }

    /// Write raw bytes to the state file.
    pub fn write_raw(&self, bytes: &[u8]) {
        std::fs::write(&self.path, bytes).expect("write state file");
    }

    /// Raw state file contents, `None` if it does not exist.
    pub fn raw(&self) -> Option<Vec<u8>> {
        std::fs::read(&self.path).ok()
    }

    /// Today's total as the ledger sees it.
    pub fn spent_today(&self) -> UsdAmount {
        self.ledger.spent_today()
    }
}

impl Default for LedgerFixture {
    fn default() -> Self {
        Self::new()
    }
}
