//! Validation errors for shared types.

use thiserror::Error;

/// Result type for type construction and parsing.
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors raised while building or parsing shared types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypesError {
    /// A USD value was negative, NaN or infinite.
    #[error("invalid USD amount: {0}")]
    InvalidAmount(String),

    /// A budget limit was zero.
    #[error("{field} must be greater than zero")]
    NonPositiveLimit {
        /// Name of the offending limit.
        field: &'static str,
    },

    /// A chain namespace string was empty.
    #[error("chain namespace cannot be empty")]
    EmptyNamespace,
}

impl TypesError {
    /// Create an invalid amount error.
    pub fn invalid_amount(value: impl ToString) -> Self {
        Self::InvalidAmount(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TypesError::NonPositiveLimit {
            field: "daily limit",
        };
        assert_eq!(err.to_string(), "daily limit must be greater than zero");

        let err = TypesError::invalid_amount(-1.5);
        assert!(err.to_string().contains("-1.5"));
    }
}
