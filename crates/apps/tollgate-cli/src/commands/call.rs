//! Call command.

use std::sync::Arc;

use serde_json::Value;
use tollgate_client::{CallOrchestrator, CallRequest, HttpMethod};
use tollgate_ledger::SpendLedger;
use tracing::debug;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{CallOutput, OutputFormat, Render};

/// Build an orchestrator from configuration, with a file ledger and signer wallets.
pub fn build_orchestrator(config: &CliConfig) -> CliResult<CallOrchestrator> {
    let client_config = config.client_config()?;
    let state_file = config.state_path();
    let wallets = config.wallet_registry()?;
    debug!(
        api_base = %client_config.api_base,
        state_file = %state_file.display(),
        wallets = wallets.len(),
        "Building orchestrator"
    );

    let ledger = Arc::new(SpendLedger::with_file(state_file));
    Ok(CallOrchestrator::new(client_config, ledger, wallets)?)
}

/// Execute the call command.
pub async fn call(
    config: &CliConfig,
    format: OutputFormat,
    endpoint: &str,
    method: HttpMethod,
    data: Option<&str>,
    headers: Vec<(String, String)>,
) -> CliResult<String> {
    let mut request = CallRequest::new(endpoint).method(method);
    for (name, value) in headers {
        request = request.header(name, value);
    }
    if let Some(data) = data {
        let body: Value = serde_json::from_str(data)
            .map_err(|e| CliError::user(format!("Request body is not valid JSON: {}", e)))?;
        request = request.body(body);
    }

    let orchestrator = build_orchestrator(config)?;
    let success = orchestrator.call(request).await?;

    Ok(CallOutput { success }.render(format))
}
