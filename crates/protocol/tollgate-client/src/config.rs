//! Client configuration.

use std::time::Duration;

use tollgate_types::{BudgetPolicy, ChainNamespace};

/// Default marketplace base URL.
pub const DEFAULT_API_BASE: &str = "https://1ly.store";

/// Path prefix under which marketplace links live.
pub const DEFAULT_LINK_PREFIX: &str = "/api/link/";

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 2;

/// Default delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Timeout and retry settings for the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Timeout for each attempt, including reading the body.
    pub timeout: Duration,
    /// Retries after the first attempt on network failure.
    pub retries: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl TransportConfig {
    /// Create a transport config.
    pub fn new(timeout: Duration, retries: u32, retry_delay: Duration) -> Self {
        Self {
            timeout,
            retries,
            retry_delay,
        }
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

/// Everything the orchestrator needs besides wallets and the ledger.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Marketplace base URL, without trailing slash.
    pub api_base: String,
    /// Prefix prepended to bare link paths.
    pub link_prefix: String,
    /// Spending limits.
    pub policy: BudgetPolicy,
    /// Namespace to prefer when several wallets could pay.
    pub preferred_namespace: ChainNamespace,
    /// Transport settings for the first attempt.
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Create a config for `api_base` with default settings.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Set the budget policy.
    pub fn with_policy(mut self, policy: BudgetPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the preferred namespace.
    pub fn with_preferred_namespace(mut self, namespace: ChainNamespace) -> Self {
        self.preferred_namespace = namespace;
        self
    }

    /// Set the transport config.
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            link_prefix: DEFAULT_LINK_PREFIX.to_string(),
            policy: BudgetPolicy::default(),
            preferred_namespace: ChainNamespace::solana(),
            transport: TransportConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base, "https://1ly.store");
        assert_eq!(config.transport.max_attempts(), 3);
        assert_eq!(config.transport.timeout, Duration::from_secs(15));
        assert_eq!(config.preferred_namespace, ChainNamespace::solana());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = ClientConfig::new("http://localhost:8080/");
        assert_eq!(config.api_base, "http://localhost:8080");
        assert_eq!(config.link_prefix, DEFAULT_LINK_PREFIX);
    }
}
