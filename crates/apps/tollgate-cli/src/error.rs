//! CLI error types.

use thiserror::Error;
use tollgate_client::{ClientError, TerminalState};
use tollgate_types::TypesError;

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error enum wrapping all crate errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A call ended in a failure state.
    #[error("{0}")]
    Client(#[from] ClientError),

    /// IO error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// User-facing error with actionable message.
    #[error("{0}")]
    User(String),

    /// The self-test found a problem.
    #[error("Self-test failed: {0}")]
    SelfTest(String),
}

impl CliError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a user-facing error.
    pub fn user(msg: impl Into<String>) -> Self {
        Self::User(msg.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors and failed self-tests: 1
            Self::User(_) | Self::SelfTest(_) => 1,
            Self::Client(e) => match e.terminal_state() {
                TerminalState::InvalidRequest => 2,
                TerminalState::BudgetRejected | TerminalState::PerCallRejected => 4,
                TerminalState::TransportFailed => 5,
                TerminalState::RemoteError => 6,
                TerminalState::PaidFailed => 7,
                TerminalState::NoObligation | TerminalState::InvalidAmount => 8,
                TerminalState::SigningUnavailable | TerminalState::SigningFailed => 9,
                TerminalState::FreeOk | TerminalState::PaidOk => 0,
            },
            // Config errors: 3
            Self::Config(_) | Self::Toml(_) => 3,
            // IO errors: 10
            Self::Io(_) => 10,
        }
    }

    /// Short code printed in brackets next to the message.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Client(e) => e.terminal_state().as_str(),
            Self::Config(_) | Self::Toml(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::User(_) => "USAGE_ERROR",
            Self::SelfTest(_) => "SELF_TEST_FAILED",
        }
    }

    /// Recovery hint, if there is one.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Client(e) => Some(e.suggestion()),
            Self::Config(_) | Self::Toml(_) => {
                Some("Check the config file passed with --config and the TOLLGATE_* variables")
            }
            Self::SelfTest(_) => Some("Re-run with --verbose for request details"),
            Self::Io(_) | Self::User(_) => None,
        }
    }
}

impl From<TypesError> for CliError {
    fn from(e: TypesError) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_ledger::LedgerError;
    use tollgate_types::UsdAmount;

    #[test]
    fn test_exit_codes_follow_terminal_state() {
        let budget: CliError = ClientError::Budget(LedgerError::BudgetExceeded {
            attempted: UsdAmount::from_micros(10_000),
            spent: UsdAmount::from_micros(50_000_000),
            limit: UsdAmount::from_micros(50_000_000),
        })
        .into();
        assert_eq!(budget.exit_code(), 4);
        assert_eq!(budget.error_code(), "BUDGET_REJECTED");

        let transport: CliError = ClientError::transport("http://x", "refused").into();
        assert_eq!(transport.exit_code(), 5);
        assert_eq!(transport.error_code(), "TRANSPORT_FAILED");

        let no_obligation: CliError = ClientError::NoObligation.into();
        assert_eq!(no_obligation.exit_code(), 8);
    }

    #[test]
    fn test_config_errors() {
        let err: CliError = TypesError::NonPositiveLimit {
            field: "daily limit",
        }
        .into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("daily limit must be greater than zero"));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_user_error_has_no_hint() {
        let err = CliError::user("bad header");
        assert_eq!(err.exit_code(), 1);
        assert!(err.suggestion().is_none());
    }
}
