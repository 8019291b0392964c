//! The payment-gated call orchestrator.
//!
//! One call walks a short state machine:
//!
//! ```text
//! FIRST_ATTEMPT ──2xx──► FREE_OK
//!       │  └─other──► REMOTE_ERROR
//!      402
//!       ▼
//! obligation ──none──► NO_OBLIGATION
//!       ▼
//! per-call cap ──over──► PER_CALL_REJECTED
//!       ▼
//! ledger ──over──► BUDGET_REJECTED
//!       ▼
//! wallet ──missing──► SIGNING_UNAVAILABLE (debit refunded)
//!       ▼
//! SIGNED_RETRY ──2xx──► PAID_OK
//!       └─other──► PAID_FAILED (debit kept)
//! ```
//!
//! Side effects happen in a fixed order: debit, then signature, then the
//! paid request. Only the first attempt is retried on network failure.

use std::sync::Arc;

use reqwest::header::HeaderValue;
use serde::Serialize;
use serde_json::Value;
use tollgate_ledger::SpendLedger;
use tollgate_types::{ChainNamespace, UsdAmount};
use tollgate_x402::{
    payment_required_from_value, select_obligation, PaymentObligation, HEADER_PAYMENT_SIGNATURE,
};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, TerminalState};
use crate::transport::{assert_ok, HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::wallet::{PaymentContext, WalletRegistry};

/// Note attached to calls that needed no payment.
pub const FREE_NOTE: &str = "No payment required (free API)";

/// Context for errors on the first attempt.
const FIRST_ATTEMPT_CONTEXT: &str = "API call failed";

/// A call to make.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    /// Link path (`joe/weather`, `/api/link/joe/weather`) or full URL.
    pub endpoint: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
}

impl CallRequest {
    /// A GET call to `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Set the method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// What was paid for a call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    /// Network identifier as advertised.
    pub network: String,
    /// Chain namespace of the signing wallet.
    pub namespace: ChainNamespace,
    /// Recipient.
    pub pay_to: String,
    /// Amount in the asset's smallest unit.
    pub amount_minor_units: u64,
    /// Price in USD.
    pub price_usd: UsdAmount,
    /// Today's total after this payment.
    pub spent_today: UsdAmount,
}

/// A successful call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSuccess {
    /// `FREE_OK` or `PAID_OK`.
    pub state: TerminalState,
    /// Resolved URL.
    pub url: String,
    /// Response body: parsed JSON, a string for non-JSON text, or null.
    pub data: Value,
    /// Payment details for paid calls.
    pub payment: Option<PaymentReceipt>,
}

impl CallSuccess {
    /// Whether the call was paid for.
    pub fn is_paid(&self) -> bool {
        self.payment.is_some()
    }
}

/// Orchestrates free and paid calls against the marketplace.
#[derive(Debug, Clone)]
pub struct CallOrchestrator {
    config: ClientConfig,
    transport: Transport,
    ledger: Arc<SpendLedger>,
    wallets: WalletRegistry,
}

impl CallOrchestrator {
    /// Create an orchestrator with a transport built from `config`.
    pub fn new(
        config: ClientConfig,
        ledger: Arc<SpendLedger>,
        wallets: WalletRegistry,
    ) -> ClientResult<Self> {
        let transport = Transport::new(config.transport)?;
        Ok(Self::with_transport(config, transport, ledger, wallets))
    }

    /// Create an orchestrator with an explicit transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Transport,
        ledger: Arc<SpendLedger>,
        wallets: WalletRegistry,
    ) -> Self {
        Self {
            config,
            transport,
            ledger,
            wallets,
        }
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared spend ledger.
    pub fn ledger(&self) -> &Arc<SpendLedger> {
        &self.ledger
    }

    /// Registered wallets.
    pub fn wallets(&self) -> &WalletRegistry {
        &self.wallets
    }

    /// Resolve an endpoint to a full URL.
    ///
    /// Full `http(s)://` URLs are kept. Paths already under the link
    /// prefix are appended to the base URL; anything else is placed under
    /// the link prefix.
    pub fn resolve_url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim();
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        let base = self.config.api_base.trim_end_matches('/');
        let prefix = format!("{}/", self.config.link_prefix.trim_end_matches('/'));
        if endpoint.starts_with(&prefix) {
            return format!("{}{}", base, endpoint);
        }
        format!("{}{}{}", base, prefix, endpoint.trim_start_matches('/'))
    }

    /// Run one call to completion.
    pub async fn call(&self, request: CallRequest) -> ClientResult<CallSuccess> {
        let url = self.resolve_url(&request.endpoint);
        let mut http =
            HttpRequest::new(request.method, &url).header("Content-Type", "application/json");
        for (name, value) in request.headers {
            http = http.header(name, value);
        }
        if let Some(body) = request.body {
            http = http.json(body);
        }

        debug!(method = %http.method, url = %url, "Starting call");
        let first = self.transport.send(&http).await?;

        if !first.is_payment_required() {
            assert_ok(&first, FIRST_ATTEMPT_CONTEXT)?;
            debug!(url = %url, status = first.status, "Call completed without payment");
            return Ok(CallSuccess {
                state: TerminalState::FreeOk,
                url,
                data: response_data(&first),
                payment: None,
            });
        }

        info!(url = %url, "Payment required");
        self.pay_and_retry(http, first).await
    }

    async fn pay_and_retry(
        &self,
        http: HttpRequest,
        first: HttpResponse,
    ) -> ClientResult<CallSuccess> {
        let body: Value = first.json().unwrap_or(Value::Null);
        let required = payment_required_from_value(&body);
        let preferred = self
            .wallets
            .preferred_namespace(&self.config.preferred_namespace);
        let obligation = select_obligation(&required, &preferred)?;
        let price = obligation.price_usd();

        let policy = &self.config.policy;
        if !policy.allows_per_call(price) {
            warn!(price_usd = %price, limit = %policy.per_call_limit(), "Per-call limit exceeded");
            return Err(ClientError::PerCallLimitExceeded {
                price,
                limit: policy.per_call_limit(),
            });
        }

        let spent_today = self.ledger.check_and_record(policy, price)?;

        let context = PaymentContext {
            url: first.url.clone(),
            method: http.method,
            headers: first.headers.clone(),
            body,
        };
        let signature = match self.sign(&obligation, &context).await {
            Ok(signature) => signature,
            Err(e) => {
                // nothing left the process, so the debit is returned
                let total = self.ledger.refund(price);
                warn!(
                    price_usd = %price,
                    spent_today = %total,
                    error = %e,
                    "Signing did not produce a payment; debit refunded"
                );
                return Err(e);
            }
        };

        let paid_request = http.header(HEADER_PAYMENT_SIGNATURE, signature);
        let paid = self.transport.send_once(&paid_request).await?;

        if !paid.is_success() {
            warn!(status = paid.status, url = %paid.url, "Paid request rejected");
            return Err(ClientError::PaymentFailed {
                status: paid.status,
                body: paid.text().into_owned(),
            });
        }

        info!(
            url = %paid.url,
            network = %obligation.network,
            price_usd = %price,
            spent_today = %spent_today,
            "Paid call completed"
        );

        Ok(CallSuccess {
            state: TerminalState::PaidOk,
            url: paid_request.url,
            data: response_data(&paid),
            payment: Some(PaymentReceipt {
                network: obligation.network,
                namespace: obligation.namespace,
                pay_to: obligation.pay_to,
                amount_minor_units: obligation.amount_minor_units,
                price_usd: price,
                spent_today,
            }),
        })
    }

    async fn sign(
        &self,
        obligation: &PaymentObligation,
        context: &PaymentContext,
    ) -> ClientResult<String> {
        let wallet = self
            .wallets
            .get(&obligation.namespace)
            .ok_or_else(|| ClientError::SigningUnavailable {
                namespace: obligation.namespace.clone(),
            })?;

        match wallet.sign(obligation, context).await {
            Ok(signature) => header_token(&obligation.namespace, &signature),
            Err(e @ ClientError::SigningFailed { .. }) => Err(e),
            Err(e) => Err(ClientError::SigningFailed {
                namespace: obligation.namespace.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Trimmed signature, refused unless it can travel as a header value.
fn header_token(namespace: &ChainNamespace, signature: &str) -> ClientResult<String> {
    let token = signature.trim();
    if token.is_empty() || HeaderValue::from_str(token).is_err() {
        return Err(ClientError::SigningFailed {
            namespace: namespace.clone(),
            reason: "signature is not a valid header value".into(),
        });
    }
    Ok(token.to_string())
}

/// Response body as JSON, falling back to text, or null when empty.
fn response_data(response: &HttpResponse) -> Value {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    response
        .json()
        .unwrap_or_else(|_| Value::String(response.text().into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> CallOrchestrator {
        CallOrchestrator::new(
            ClientConfig::new("https://api.example"),
            Arc::new(SpendLedger::in_memory()),
            WalletRegistry::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_url() {
        let o = orchestrator();
        assert_eq!(
            o.resolve_url("joe/weather"),
            "https://api.example/api/link/joe/weather"
        );
        assert_eq!(
            o.resolve_url("/joe/weather"),
            "https://api.example/api/link/joe/weather"
        );
        assert_eq!(
            o.resolve_url("/api/link/joe/weather"),
            "https://api.example/api/link/joe/weather"
        );
        assert_eq!(
            o.resolve_url("http://other.host/x"),
            "http://other.host/x"
        );
    }

    #[test]
    fn test_resolve_url_matches_whole_prefix_segment() {
        let mut config = ClientConfig::new("https://api.example/");
        config.link_prefix = "/api/link".into();
        let o = CallOrchestrator::new(
            config,
            Arc::new(SpendLedger::in_memory()),
            WalletRegistry::new(),
        )
        .unwrap();
        assert_eq!(
            o.resolve_url("/api/linkage"),
            "https://api.example/api/link/api/linkage"
        );
        assert_eq!(
            o.resolve_url("/api/link/joe/weather"),
            "https://api.example/api/link/joe/weather"
        );
        assert_eq!(
            o.resolve_url("joe/weather"),
            "https://api.example/api/link/joe/weather"
        );
    }

    #[test]
    fn test_header_token() {
        let ns = ChainNamespace::solana();
        assert_eq!(header_token(&ns, "  SIG\n").unwrap(), "SIG");
        assert!(matches!(
            header_token(&ns, "S\nIG"),
            Err(ClientError::SigningFailed { .. })
        ));
        assert!(header_token(&ns, "   ").is_err());
    }

    #[test]
    fn test_response_data() {
        let mut response = HttpResponse {
            status: 200,
            status_text: "OK".into(),
            url: "http://x".into(),
            headers: Vec::new(),
            body: br#"{"a":1}"#.to_vec(),
        };
        assert_eq!(response_data(&response), serde_json::json!({"a": 1}));

        response.body = b"plain text".to_vec();
        assert_eq!(response_data(&response), Value::String("plain text".into()));

        response.body = Vec::new();
        assert_eq!(response_data(&response), Value::Null);
    }

    #[test]
    fn test_call_request_builder() {
        let request = CallRequest::new("joe/weather")
            .method(HttpMethod::Post)
            .header("X-Key", "1")
            .body(serde_json::json!({"city": "Oslo"}));
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers, vec![("X-Key".to_string(), "1".to_string())]);
        assert!(request.body.is_some());
    }
}
