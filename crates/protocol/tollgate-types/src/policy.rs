//! Spending limits.

use serde::{Deserialize, Serialize};

use crate::amount::UsdAmount;
use crate::error::{TypesError, TypesResult};

/// Default per-call limit in USD.
pub const DEFAULT_PER_CALL_USD: f64 = 1.0;

/// Default daily limit in USD.
pub const DEFAULT_DAILY_USD: f64 = 50.0;

/// Per-call and daily spending limits.
///
/// Both limits are strictly positive. A policy is immutable for the
/// lifetime of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawBudgetPolicy")]
pub struct BudgetPolicy {
    per_call_limit: UsdAmount,
    daily_limit: UsdAmount,
}

/// Unchecked wire form, validated through [`BudgetPolicy::new`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBudgetPolicy {
    per_call_limit: UsdAmount,
    daily_limit: UsdAmount,
}

impl TryFrom<RawBudgetPolicy> for BudgetPolicy {
    type Error = TypesError;

    fn try_from(raw: RawBudgetPolicy) -> TypesResult<Self> {
        Self::new(raw.per_call_limit, raw.daily_limit)
    }
}

impl BudgetPolicy {
    /// Create a policy, rejecting zero limits.
    pub fn new(per_call_limit: UsdAmount, daily_limit: UsdAmount) -> TypesResult<Self> {
        if per_call_limit.is_zero() {
            return Err(TypesError::NonPositiveLimit {
                field: "per-call limit",
            });
        }
        if daily_limit.is_zero() {
            return Err(TypesError::NonPositiveLimit {
                field: "daily limit",
            });
        }
        Ok(Self {
            per_call_limit,
            daily_limit,
        })
    }

    /// Create a policy from dollar values.
    pub fn from_usd(per_call_usd: f64, daily_usd: f64) -> TypesResult<Self> {
        Self::new(
            UsdAmount::from_usd(per_call_usd)?,
            UsdAmount::from_usd(daily_usd)?,
        )
    }

    /// Maximum price of a single call.
    pub fn per_call_limit(&self) -> UsdAmount {
        self.per_call_limit
    }

    /// Maximum total spend per calendar day.
    pub fn daily_limit(&self) -> UsdAmount {
        self.daily_limit
    }

    /// Whether a single call at `price` is within the per-call limit.
    pub fn allows_per_call(&self, price: UsdAmount) -> bool {
        price <= self.per_call_limit
    }
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            per_call_limit: UsdAmount::from_micros(1_000_000),
            daily_limit: UsdAmount::from_micros(50_000_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_constants() {
        let policy = BudgetPolicy::default();
        assert_eq!(policy.per_call_limit().as_usd(), DEFAULT_PER_CALL_USD);
        assert_eq!(policy.daily_limit().as_usd(), DEFAULT_DAILY_USD);
    }

    #[test]
    fn test_rejects_zero_limits() {
        assert_eq!(
            BudgetPolicy::from_usd(0.0, 10.0),
            Err(TypesError::NonPositiveLimit {
                field: "per-call limit"
            })
        );
        assert_eq!(
            BudgetPolicy::from_usd(1.0, 0.0),
            Err(TypesError::NonPositiveLimit {
                field: "daily limit"
            })
        );
        assert!(BudgetPolicy::from_usd(-1.0, 10.0).is_err());
    }

    #[test]
    fn test_deserialize_validates_limits() {
        let policy: BudgetPolicy =
            serde_json::from_str(r#"{"perCallLimit": 0.5, "dailyLimit": 10}"#).unwrap();
        assert_eq!(policy, BudgetPolicy::from_usd(0.5, 10.0).unwrap());

        let err = serde_json::from_str::<BudgetPolicy>(r#"{"perCallLimit": 0, "dailyLimit": 10}"#)
            .unwrap_err();
        assert!(err.to_string().contains("per-call limit"));
        assert!(
            serde_json::from_str::<BudgetPolicy>(r#"{"perCallLimit": 1, "dailyLimit": 0}"#)
                .is_err()
        );
    }

    #[test]
    fn test_allows_per_call_is_inclusive() {
        let policy = BudgetPolicy::from_usd(0.01, 1.0).unwrap();
        assert!(policy.allows_per_call(UsdAmount::from_micros(10_000)));
        assert!(!policy.allows_per_call(UsdAmount::from_micros(10_001)));
    }
}
