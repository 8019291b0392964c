//! The daily spend ledger.
//!
//! Enforces the daily limit across calls and process restarts. Reads and
//! writes are fail-open: a missing, unreadable or corrupt record is
//! treated as "nothing spent today", and a failed write is logged but
//! does not block the call.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tollgate_types::{BudgetPolicy, UsdAmount};
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::record::SpendRecord;
use crate::store::{FileSpendStore, MemorySpendStore, SpendStore};

/// Snapshot of today's spending against a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    /// UTC day the snapshot applies to.
    pub date: NaiveDate,
    /// Total spent today.
    pub spent: UsdAmount,
    /// Per-call limit.
    pub per_call_limit: UsdAmount,
    /// Daily limit.
    pub daily_limit: UsdAmount,
    /// Daily limit minus spend, floored at zero.
    pub remaining: UsdAmount,
}

/// Persistent daily spend counter.
///
/// Check-and-record is serialised within one ledger; share it between
/// concurrent calls with an `Arc`. Separate processes using the same file
/// are not coordinated.
pub struct SpendLedger {
    store: Arc<dyn SpendStore>,
    lock: Mutex<()>,
}

impl std::fmt::Debug for SpendLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpendLedger").finish_non_exhaustive()
    }
}

impl SpendLedger {
    /// Create a ledger over any store.
    pub fn new(store: Arc<dyn SpendStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Create a ledger backed by a JSON file.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileSpendStore::new(path)))
    }

    /// Create a ledger that forgets everything when dropped.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySpendStore::new()))
    }

    /// Current UTC calendar day.
    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Check a debit against the daily limit and record it.
    ///
    /// Returns today's new total. On [`LedgerError::BudgetExceeded`] the
    /// stored record is left untouched.
    pub fn check_and_record(
        &self,
        policy: &BudgetPolicy,
        amount: UsdAmount,
    ) -> LedgerResult<UsdAmount> {
        self.check_and_record_on(Self::today(), policy, amount)
    }

    /// [`check_and_record`](Self::check_and_record) for an explicit day.
    pub fn check_and_record_on(
        &self,
        today: NaiveDate,
        policy: &BudgetPolicy,
        amount: UsdAmount,
    ) -> LedgerResult<UsdAmount> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.load_spent(today);
        let next = current
            .checked_add(amount)
            .filter(|next| *next <= policy.daily_limit());
        let Some(next) = next else {
            warn!(
                price_usd = %amount,
                spent = %current,
                limit = %policy.daily_limit(),
                "Daily budget would be exceeded"
            );
            return Err(LedgerError::BudgetExceeded {
                attempted: amount,
                spent: current,
                limit: policy.daily_limit(),
            });
        };

        self.persist(SpendRecord::new(today, next));
        info!(price_usd = %amount, spent_today = %next, "Recorded spend");
        Ok(next)
    }

    /// Total spent today. Never writes.
    pub fn spent_today(&self) -> UsdAmount {
        self.spent_on(Self::today())
    }

    /// Total spent on `day`. Never writes.
    pub fn spent_on(&self, day: NaiveDate) -> UsdAmount {
        self.load_spent(day)
    }

    /// Today's spending against `policy`.
    pub fn status(&self, policy: &BudgetPolicy) -> BudgetStatus {
        self.status_on(Self::today(), policy)
    }

    /// Spending on `day` against `policy`.
    pub fn status_on(&self, day: NaiveDate, policy: &BudgetPolicy) -> BudgetStatus {
        let spent = self.load_spent(day);
        BudgetStatus {
            date: day,
            spent,
            per_call_limit: policy.per_call_limit(),
            daily_limit: policy.daily_limit(),
            remaining: policy.daily_limit().saturating_sub(spent),
        }
    }

    /// Give back a previously recorded debit.
    ///
    /// Best-effort: the total floors at zero and a failed write is only
    /// logged. Returns today's new total.
    pub fn refund(&self, amount: UsdAmount) -> UsdAmount {
        self.refund_on(Self::today(), amount)
    }

    /// [`refund`](Self::refund) for an explicit day.
    pub fn refund_on(&self, today: NaiveDate, amount: UsdAmount) -> UsdAmount {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.load_spent(today);
        let next = current.saturating_sub(amount);
        if next != current {
            self.persist(SpendRecord::new(today, next));
        }
        info!(refund_usd = %amount, spent_today = %next, "Refunded spend");
        next
    }

    fn load_spent(&self, today: NaiveDate) -> UsdAmount {
        match self.store.load() {
            Ok(Some(record)) => {
                if record.date != today {
                    debug!(stored = %record.date, %today, "Spend record is from another day");
                }
                record.spent_on(today)
            }
            Ok(None) => UsdAmount::ZERO,
            Err(e) => {
                warn!(error = %e, "Could not read spend record; assuming nothing spent today");
                UsdAmount::ZERO
            }
        }
    }

    fn persist(&self, record: SpendRecord) {
        if let Err(e) = self.store.save(&record) {
            warn!(error = %e, "Could not persist spend record; continuing");
        }
    }
}
