//! Error types for x402 negotiation.

use thiserror::Error;

/// Result type for x402 operations.
pub type X402Result<T> = Result<T, X402Error>;

/// Errors that can occur while turning a 402 response into an obligation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum X402Error {
    /// The 402 body carried no usable payment requirements.
    #[error("402 response missing payment requirements in body")]
    NoObligation,

    /// The selected requirement had a missing, non-numeric or non-positive amount.
    #[error("Invalid or missing payment amount in 402 requirements")]
    InvalidAmount {
        /// The raw amount as received, if any.
        raw: Option<String>,
    },
}

impl X402Error {
    /// Create an invalid amount error from the raw value.
    pub fn invalid_amount(raw: Option<impl Into<String>>) -> Self {
        Self::InvalidAmount {
            raw: raw.map(Into::into),
        }
    }

    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::NoObligation => {
                "The endpoint asked for payment but did not say how; contact the API owner"
            }
            Self::InvalidAmount { .. } => {
                "The endpoint advertised an unusable price; contact the API owner"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            X402Error::NoObligation.to_string(),
            "402 response missing payment requirements in body"
        );
        let err = X402Error::invalid_amount(Some("abc"));
        assert_eq!(
            err,
            X402Error::InvalidAmount {
                raw: Some("abc".to_string())
            }
        );
        assert!(err.to_string().contains("payment amount"));
    }

    #[test]
    fn test_error_suggestions() {
        assert!(!X402Error::NoObligation.suggestion().is_empty());
        assert!(!X402Error::invalid_amount(None::<String>).suggestion().is_empty());
    }
}
