//! Self-test command.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tollgate_client::{assert_ok, HttpRequest, Transport, TransportConfig};
use tracing::debug;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, Render, SelfTestOutput};

/// Timeout for the reachability probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries for the reachability probe.
pub const PROBE_RETRIES: u32 = 1;

/// Path and query of the reachability probe.
pub const PROBE_PATH: &str = "/api/discover?q=api&limit=1";

/// Execute the self-test command.
///
/// Progress lines are written to `log` with a `[self-test]` prefix. Any
/// problem ends the test with [`CliError::SelfTest`].
pub async fn self_test(
    config: &CliConfig,
    config_path: &Path,
    format: OutputFormat,
    no_network: bool,
    log: &mut dyn Write,
) -> CliResult<String> {
    step(log, format!("loading config from {}", config_path.display()))?;
    let client_config = config.client_config().map_err(fail)?;
    step(log, format!("apiBase={}", client_config.api_base))?;
    step(
        log,
        format!(
            "budget perCall={} daily={} stateFile={}",
            client_config.policy.per_call_limit(),
            client_config.policy.daily_limit(),
            config.state_path().display()
        ),
    )?;

    let wallets = config.wallet_registry().map_err(fail)?;
    let mut described = Vec::new();
    if wallets.is_empty() {
        step(log, "wallets: none configured (paid calls will be refused)")?;
    }
    for wallet in wallets.wallets() {
        let line = wallet.describe();
        step(log, format!("wallet {}", line))?;
        described.push(line);
    }

    if no_network {
        step(log, "skipping reachability check")?;
    } else {
        step(log, "checking reachability")?;
        let probe = TransportConfig::new(
            PROBE_TIMEOUT,
            PROBE_RETRIES,
            client_config.transport.retry_delay,
        );
        let transport = Transport::new(probe).map_err(fail)?;
        let url = format!("{}{}", client_config.api_base, PROBE_PATH);
        debug!(url = %url, "Probing API");
        let response = transport.send(&HttpRequest::get(url)).await.map_err(fail)?;
        assert_ok(&response, "Self-test request failed").map_err(fail)?;
    }

    step(log, "OK")?;

    let output = SelfTestOutput {
        ok: true,
        api_base: client_config.api_base,
        wallets: described,
        reachability_checked: !no_network,
    };
    Ok(output.render(format))
}

fn step(log: &mut dyn Write, message: impl AsRef<str>) -> CliResult<()> {
    writeln!(log, "[self-test] {}", message.as_ref())?;
    Ok(())
}

fn fail(e: impl std::fmt::Display) -> CliError {
    CliError::SelfTest(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::WalletConfig;

    fn config_for(server_uri: String) -> CliConfig {
        let mut config = CliConfig::default();
        config.api.base_url = server_uri;
        config.budget.state_file = Some("/tmp/tollgate-self-test/budget.json".into());
        config.transport.retry_delay_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_self_test_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/discover"))
            .and(query_param("q", "api"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = config_for(server.uri());
        config.wallets.insert(
            "solana".to_string(),
            WalletConfig {
                signer_url: "http://127.0.0.1:9100".to_string(),
                auth_header: None,
            },
        );

        let mut log = Vec::new();
        let out = self_test(
            &config,
            Path::new("config.toml"),
            OutputFormat::Json,
            false,
            &mut log,
        )
        .await
        .unwrap();

        let log = String::from_utf8(log).unwrap();
        assert!(log.contains("[self-test] loading config"));
        assert!(log.contains(&format!("[self-test] apiBase={}", server.uri())));
        assert!(log.contains("[self-test] wallet solana signer at http://127.0.0.1:9100"));
        assert!(log.contains("[self-test] checking reachability"));
        assert!(log.trim_end().ends_with("[self-test] OK"));

        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["reachabilityChecked"], true);
        assert_eq!(value["wallets"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_self_test_reports_remote_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/discover"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let mut log = Vec::new();
        let err = self_test(
            &config_for(server.uri()),
            Path::new("config.toml"),
            OutputFormat::Human,
            false,
            &mut log,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CliError::SelfTest(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("Self-test request failed"));
        assert!(!String::from_utf8(log).unwrap().contains("[self-test] OK"));
    }

    #[tokio::test]
    async fn test_self_test_unreachable_retries_once() {
        // nothing listens on port 9 locally
        let mut log = Vec::new();
        let err = self_test(
            &config_for("http://127.0.0.1:9".to_string()),
            Path::new("config.toml"),
            OutputFormat::Human,
            false,
            &mut log,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("after 2 attempt(s)"));
    }

    #[tokio::test]
    async fn test_self_test_offline() {
        let mut log = Vec::new();
        let out = self_test(
            &config_for("http://unused.invalid".to_string()),
            Path::new("config.toml"),
            OutputFormat::Human,
            true,
            &mut log,
        )
        .await
        .unwrap();

        let log = String::from_utf8(log).unwrap();
        assert!(log.contains("none configured"));
        assert!(log.contains("skipping reachability check"));
        assert!(out.contains("OK"));
    }

    #[tokio::test]
    async fn test_self_test_rejects_invalid_budget() {
        let mut config = config_for("http://unused.invalid".to_string());
        config.budget.per_call_usd = -1.0;

        let err = self_test(
            &config,
            Path::new("config.toml"),
            OutputFormat::Human,
            true,
            &mut Vec::<u8>::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::SelfTest(_)));
    }
}
