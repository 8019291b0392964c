//! CLI configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tollgate_client::{
    ClientConfig, HttpSignerWallet, TransportConfig, WalletRegistry, DEFAULT_API_BASE,
    DEFAULT_LINK_PREFIX,
};
use tollgate_types::policy::{DEFAULT_DAILY_USD, DEFAULT_PER_CALL_USD};
use tollgate_types::{BudgetPolicy, ChainNamespace};

use crate::error::{CliError, CliResult};

/// Overrides `[api] base_url`.
pub const ENV_API_BASE: &str = "TOLLGATE_API_BASE";
/// Overrides `[budget] per_call_usd`.
pub const ENV_BUDGET_PER_CALL: &str = "TOLLGATE_BUDGET_PER_CALL";
/// Overrides `[budget] daily_usd`.
pub const ENV_BUDGET_DAILY: &str = "TOLLGATE_BUDGET_DAILY";
/// Overrides `[budget] state_file`.
pub const ENV_BUDGET_STATE_FILE: &str = tollgate_ledger::STATE_FILE_ENV;
/// Overrides `[payment] network`.
pub const ENV_NETWORK: &str = "TOLLGATE_NETWORK";
/// Overrides `[wallets.solana] signer_url`.
pub const ENV_SOLANA_SIGNER_URL: &str = "TOLLGATE_SOLANA_SIGNER_URL";
/// Overrides `[wallets.eip155] signer_url`.
pub const ENV_EVM_SIGNER_URL: &str = "TOLLGATE_EVM_SIGNER_URL";

/// Expand environment variables in a string.
/// Supports `${VAR_NAME}` syntax; unknown variables are left as written.
fn expand_env_vars(input: &str) -> CliResult<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| CliError::config(format!("Invalid expansion pattern: {}", e)))?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string())
}

/// CLI configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Marketplace API settings.
    pub api: ApiConfig,
    /// Spending limits and ledger location.
    pub budget: BudgetConfig,
    /// Timeouts and retries.
    pub transport: TransportSection,
    /// Payment preferences.
    pub payment: PaymentConfig,
    /// Signers keyed by chain namespace (`solana`, `eip155`, or an alias such as `evm`).
    pub wallets: BTreeMap<String, WalletConfig>,
}

impl CliConfig {
    /// Load configuration from a file, then apply environment overrides.
    pub fn load(path: &Path) -> CliResult<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a file only.
    ///
    /// A missing file yields the defaults. `${VAR}` references in wallet
    /// settings are expanded.
    pub fn load_file(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;

        for wallet in config.wallets.values_mut() {
            wallet.signer_url = expand_env_vars(&wallet.signer_url)?;
            if let Some(header) = wallet.auth_header.as_mut() {
                *header = expand_env_vars(header)?;
            }
        }

        Ok(config)
    }

    /// Apply `TOLLGATE_*` overrides using `lookup` to read variables.
    ///
    /// Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> CliResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base) = get(ENV_API_BASE) {
            self.api.base_url = base;
        }
        if let Some(value) = get(ENV_BUDGET_PER_CALL) {
            self.budget.per_call_usd = parse_usd(ENV_BUDGET_PER_CALL, &value)?;
        }
        if let Some(value) = get(ENV_BUDGET_DAILY) {
            self.budget.daily_usd = parse_usd(ENV_BUDGET_DAILY, &value)?;
        }
        if let Some(path) = get(ENV_BUDGET_STATE_FILE) {
            self.budget.state_file = Some(PathBuf::from(path));
        }
        if let Some(network) = get(ENV_NETWORK) {
            self.payment.network = network;
        }
        if let Some(url) = get(ENV_SOLANA_SIGNER_URL) {
            self.wallet_entry(&ChainNamespace::solana()).signer_url = url;
        }
        if let Some(url) = get(ENV_EVM_SIGNER_URL) {
            self.wallet_entry(&ChainNamespace::eip155()).signer_url = url;
        }
        Ok(())
    }

    /// Wallet settings for `namespace`, reusing an alias key if the file has one.
    fn wallet_entry(&mut self, namespace: &ChainNamespace) -> &mut WalletConfig {
        let key = self
            .wallets
            .keys()
            .find(|key| key.parse::<ChainNamespace>().ok().as_ref() == Some(namespace))
            .cloned()
            .unwrap_or_else(|| namespace.to_string());
        self.wallets.entry(key).or_default()
    }

    /// Validated budget policy.
    pub fn policy(&self) -> CliResult<BudgetPolicy> {
        Ok(BudgetPolicy::from_usd(
            self.budget.per_call_usd,
            self.budget.daily_usd,
        )?)
    }

    /// Ledger state file location.
    pub fn state_path(&self) -> PathBuf {
        self.budget
            .state_file
            .clone()
            .unwrap_or_else(tollgate_ledger::default_state_path)
    }

    /// Namespace preferred when several wallets could pay.
    pub fn preferred_namespace(&self) -> CliResult<ChainNamespace> {
        self.payment.network.parse::<ChainNamespace>().map_err(|e| {
            CliError::config(format!(
                "payment.network '{}': {}",
                self.payment.network, e
            ))
        })
    }

    /// Transport settings.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(
            Duration::from_millis(self.transport.timeout_ms),
            self.transport.retries,
            Duration::from_millis(self.transport.retry_delay_ms),
        )
    }

    /// Orchestrator settings built from this config.
    pub fn client_config(&self) -> CliResult<ClientConfig> {
        let mut config = ClientConfig::new(self.api.base_url.trim())
            .with_policy(self.policy()?)
            .with_preferred_namespace(self.preferred_namespace()?)
            .with_transport(self.transport_config());
        if !self.api.link_prefix.trim().is_empty() {
            config.link_prefix = self.api.link_prefix.trim().to_string();
        }
        Ok(config)
    }

    /// Signer wallets for every `[wallets.*]` entry with a signer URL.
    pub fn wallet_registry(&self) -> CliResult<WalletRegistry> {
        let mut registry = WalletRegistry::new();
        for (key, wallet) in &self.wallets {
            if wallet.signer_url.trim().is_empty() {
                continue;
            }
            let namespace = key
                .parse::<ChainNamespace>()
                .map_err(|e| CliError::config(format!("wallets.{}: {}", key, e)))?;
            let mut signer = HttpSignerWallet::new(namespace, wallet.signer_url.trim())?;
            if let Some(header) = wallet.auth_header.as_ref().filter(|h| !h.is_empty()) {
                signer = signer.with_auth_header(header.clone());
            }
            registry.register(Arc::new(signer));
        }
        Ok(registry)
    }
}

fn parse_usd(var: &str, value: &str) -> CliResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| CliError::config(format!("{} must be a number, got '{}'", var, value)))
}

/// Marketplace API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the marketplace.
    pub base_url: String,
    /// Prefix placed before bare endpoint paths.
    pub link_prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            link_prefix: DEFAULT_LINK_PREFIX.to_string(),
        }
    }
}

/// Budget configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Maximum price of one call (USD).
    pub per_call_usd: f64,
    /// Maximum spend per UTC day (USD).
    pub daily_usd: f64,
    /// Ledger file; defaults to `budget.json` in the data directory.
    pub state_file: Option<PathBuf>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            per_call_usd: DEFAULT_PER_CALL_USD,
            daily_usd: DEFAULT_DAILY_USD,
            state_file: None,
        }
    }
}

/// Transport configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSection {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay between attempts in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for TransportSection {
    fn default() -> Self {
        let defaults = TransportConfig::default();
        Self {
            timeout_ms: defaults.timeout.as_millis() as u64,
            retries: defaults.retries,
            retry_delay_ms: defaults.retry_delay.as_millis() as u64,
        }
    }
}

/// Payment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Preferred chain (`solana` or `base`).
    pub network: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            network: "solana".to_string(),
        }
    }
}

/// One external signer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Base URL of the signer service.
    pub signer_url: String,
    /// Value sent as the `Authorization` header.
    pub auth_header: Option<String>,
}

/// Get the default configuration file path.
pub fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("io", "tollgate", "tollgate")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| tollgate_ledger::default_data_dir().join("config.toml"))
}
