//! Remote signer wallet.
//!
//! Delegates signing to an external service that holds the keys. The
//! service receives the obligation and the 402 context and answers with
//! the header value to attach.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tollgate_types::ChainNamespace;
use tollgate_x402::PaymentObligation;
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::wallet::{PaymentContext, Wallet};

/// Default HTTP timeout for signer requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request body sent to `{base}/sign`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest<'a> {
    /// Namespace the signature is for.
    pub namespace: &'a ChainNamespace,
    /// Obligation to pay.
    pub obligation: &'a PaymentObligation,
    /// 402 response context.
    pub context: &'a PaymentContext,
}

/// Response body from `{base}/sign`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    /// Value for the `payment-signature` header.
    pub payment_signature: String,
}

/// Wallet backed by an HTTP signer service.
#[derive(Debug, Clone)]
pub struct HttpSignerWallet {
    /// HTTP client
    client: Client,
    /// Base URL of the signer
    base_url: String,
    /// Namespace this signer serves
    namespace: ChainNamespace,
    /// Value for the Authorization header
    auth_header: Option<String>,
}

impl HttpSignerWallet {
    /// Create a signer wallet for `namespace` at `signer_url`.
    pub fn new(namespace: ChainNamespace, signer_url: &str) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| {
                ClientError::invalid_request(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: signer_url.trim_end_matches('/').to_string(),
            namespace,
            auth_header: None,
        })
    }

    /// Send `value` as the Authorization header on every sign request.
    pub fn with_auth_header(mut self, value: impl Into<String>) -> Self {
        self.auth_header = Some(value.into());
        self
    }

    fn failed(&self, reason: impl Into<String>) -> ClientError {
        ClientError::SigningFailed {
            namespace: self.namespace.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Wallet for HttpSignerWallet {
    fn namespace(&self) -> ChainNamespace {
        self.namespace.clone()
    }

    fn describe(&self) -> String {
        format!("{} signer at {}", self.namespace, self.base_url)
    }

    async fn sign(
        &self,
        obligation: &PaymentObligation,
        context: &PaymentContext,
    ) -> ClientResult<String> {
        let url = format!("{}/sign", self.base_url);
        debug!(url = %url, network = %obligation.network, "Requesting payment signature");

        let request = SignRequest {
            namespace: &self.namespace,
            obligation,
            context,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(auth) = &self.auth_header {
            builder = builder.header(reqwest::header::AUTHORIZATION, auth.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.failed(format!("signer unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.failed(format!("signer returned {}: {}", status, body)));
        }

        let signed: SignResponse = response
            .json()
            .await
            .map_err(|e| self.failed(format!("failed to parse signer response: {}", e)))?;

        if signed.payment_signature.trim().is_empty() {
            return Err(self.failed("signer returned an empty signature"));
        }

        info!(
            namespace = %self.namespace,
            network = %obligation.network,
            amount = obligation.amount_minor_units,
            "Payment signed"
        );
        Ok(signed.payment_signature)
    }
}
