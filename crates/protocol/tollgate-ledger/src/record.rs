//! The persisted spend record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tollgate_types::UsdAmount;

/// Total spend for one UTC calendar day.
///
/// Stored as `{"date":"YYYY-MM-DD","spentToday":<number>}`. A record for
/// any other day than today counts as zero spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendRecord {
    /// Day the total applies to.
    pub date: NaiveDate,
    /// Total successful spend on `date`.
    pub spent_today: UsdAmount,
}

impl SpendRecord {
    /// Create a record.
    pub fn new(date: NaiveDate, spent_today: UsdAmount) -> Self {
        Self { date, spent_today }
    }

    /// Spend that counts against `day`.
    pub fn spent_on(&self, day: NaiveDate) -> UsdAmount {
        if self.date == day {
            self.spent_today
        } else {
            UsdAmount::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_json_layout() {
        let record = SpendRecord::new(day(14), UsdAmount::from_micros(250_000));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"date":"2026-03-14","spentToday":0.25}"#);

        let parsed: SpendRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_float_noise_is_rounded() {
        let parsed: SpendRecord =
            serde_json::from_str(r#"{"date":"2026-03-14","spentToday":0.30000000000000004}"#)
                .unwrap();
        assert_eq!(parsed.spent_today.micros(), 300_000);
    }

    #[test]
    fn test_stale_record_counts_as_zero() {
        let record = SpendRecord::new(day(13), UsdAmount::from_micros(50_000_000));
        assert_eq!(record.spent_on(day(14)), UsdAmount::ZERO);
        assert_eq!(record.spent_on(day(13)).micros(), 50_000_000);
    }
}
