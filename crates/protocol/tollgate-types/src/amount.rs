//! USD amounts.
//!
//! Amounts are held as integer micro-dollars (10^-6 USD) so that repeated
//! debits never accumulate floating-point drift. On the wire (ledger file,
//! JSON output) they appear as plain JSON numbers in dollars.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{TypesError, TypesResult};

/// Micro-dollars per USD (10^6).
pub const MICROS_PER_USD: u64 = 1_000_000;

/// A non-negative USD amount with micro-dollar precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UsdAmount(u64);

impl UsdAmount {
    /// Zero dollars.
    pub const ZERO: Self = Self(0);

    /// Create an amount from micro-dollars.
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Create an amount from a dollar value, rounding to the nearest micro-dollar.
    ///
    /// Fails for negative, NaN or infinite input.
    pub fn from_usd(usd: f64) -> TypesResult<Self> {
        if !usd.is_finite() || usd < 0.0 {
            return Err(TypesError::invalid_amount(usd));
        }
        let micros = (usd * MICROS_PER_USD as f64).round();
        if micros > u64::MAX as f64 {
            return Err(TypesError::invalid_amount(usd));
        }
        Ok(Self(micros as u64))
    }

    /// Amount in micro-dollars.
    pub const fn micros(self) -> u64 {
        self.0
    }

    /// Amount in dollars.
    pub fn as_usd(self) -> f64 {
        self.0 as f64 / MICROS_PER_USD as f64
    }

    /// Whether this amount is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Saturating subtraction, floored at zero.
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for UsdAmount {
    /// Formats as `$D.CC`, keeping sub-cent digits only when present.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = self.0 / MICROS_PER_USD;
        let fraction = format!("{:06}", self.0 % MICROS_PER_USD);
        let trimmed = fraction.trim_end_matches('0');
        let digits = if trimmed.len() < 2 {
            &fraction[..2]
        } else {
            trimmed
        };
        write!(f, "${}.{}", dollars, digits)
    }
}

impl Serialize for UsdAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_usd())
    }
}

impl<'de> Deserialize<'de> for UsdAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let usd = f64::deserialize(deserializer)?;
        Self::from_usd(usd).map_err(de::Error::custom)
    }
}
