//! HTTP transport with per-attempt timeouts and bounded retries.
//!
//! Each attempt sends the request and buffers the whole body under one
//! timeout. Network and timeout failures are retried after a fixed
//! delay; any HTTP response, whatever its status, is returned as is.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::TransportConfig;
use crate::error::{body_snippet, ClientError, ClientResult};
use crate::retry::RetryPolicy;

// =============================================================================
// Request / Response
// =============================================================================

/// HTTP methods a call may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Method name in upper case.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    fn to_reqwest(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
            Self::Patch => Method::PATCH,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            _ => Err(ClientError::invalid_request(format!(
                "unsupported HTTP method: {}",
                s
            ))),
        }
    }
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// Headers in insertion order; names are unique ignoring case.
    pub headers: Vec<(String, String)>,
    /// JSON body, sent only when present.
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Create a request without headers or body.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Set a header, replacing any header with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Set the JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header value, ignoring case.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase, empty when unknown.
    pub status_text: String,
    /// Final URL after redirects.
    pub url: String,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the status is 402 Payment Required.
    pub fn is_payment_required(&self) -> bool {
        self.status == 402
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body parsed as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// Look up a header value, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Convert a non-2xx response into a [`ClientError::Remote`].
///
/// The error carries at most [`BODY_SNIPPET_CHARS`](crate::error::BODY_SNIPPET_CHARS)
/// characters of the body.
pub fn assert_ok(response: &HttpResponse, context: &str) -> ClientResult<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(ClientError::Remote {
        context: context.to_string(),
        status: response.status,
        status_text: response.status_text.clone(),
        url: response.url.clone(),
        body: body_snippet(&response.text()),
    })
}

// =============================================================================
// Transport
// =============================================================================

/// HTTP client with timeout and retry behaviour.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    config: TransportConfig,
    retry: RetryPolicy,
}

impl Transport {
    /// Create a transport with its own HTTP client.
    pub fn new(config: TransportConfig) -> ClientResult<Self> {
        let client = Client::builder().build().map_err(|e| {
            ClientError::invalid_request(format!("failed to create HTTP client: {}", e))
        })?;
        Ok(Self::with_client(client, config))
    }

    /// Create a transport around an existing client.
    pub fn with_client(client: Client, config: TransportConfig) -> Self {
        Self {
            client,
            retry: RetryPolicy::from_config(&config),
            config,
        }
    }

    /// Transport settings.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Send a request, retrying network and timeout failures.
    pub async fn send(&self, request: &HttpRequest) -> ClientResult<HttpResponse> {
        self.retry
            .execute(|attempt| self.attempt(request, attempt))
            .await
    }

    /// Send a request exactly once.
    pub async fn send_once(&self, request: &HttpRequest) -> ClientResult<HttpResponse> {
        RetryPolicy::once()
            .execute(|attempt| self.attempt(request, attempt))
            .await
    }

    async fn attempt(&self, request: &HttpRequest, attempt: u32) -> ClientResult<HttpResponse> {
        debug!(
            method = %request.method,
            url = %request.url,
            attempt,
            "Sending request"
        );

        let mut builder = self
            .client
            .request(request.method.to_reqwest(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let url = response.url().to_string();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(HttpResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                url,
                headers,
                body: body.to_vec(),
            })
        };

        match tokio::time::timeout(self.config.timeout, exchange).await {
            Ok(Ok(response)) => {
                debug!(
                    url = %response.url,
                    status = response.status,
                    bytes = response.body.len(),
                    "Received response"
                );
                Ok(response)
            }
            Ok(Err(e)) if e.is_builder() => Err(ClientError::invalid_request(e.to_string())),
            Ok(Err(e)) => Err(ClientError::transport(&request.url, e)),
            Err(_) => Err(ClientError::transport(
                &request.url,
                format!("timed out after {}ms", self.config.timeout.as_millis()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            status_text: String::new(),
            url: "http://localhost/api".into(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!(matches!(
            "TRACE".parse::<HttpMethod>(),
            Err(ClientError::InvalidRequest(_))
        ));
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_header_replaces_case_insensitively() {
        let request = HttpRequest::get("http://x")
            .header("Content-Type", "application/json")
            .header("content-type", "text/plain")
            .header("X-Trace", "1");

        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.header_value("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(request.header_value("x-trace"), Some("1"));
    }

    #[test]
    fn test_request_json_body() {
        let request = HttpRequest::new(HttpMethod::Post, "http://x").json(json!({"q": 1}));
        assert_eq!(request.body, Some(json!({"q": 1})));
    }

    #[test]
    fn test_response_helpers() {
        let res = response(200, r#"{"hello":"world"}"#);
        assert!(res.is_success());
        assert!(!res.is_payment_required());
        assert_eq!(res.json::<Value>().unwrap()["hello"], "world");
        assert_eq!(res.header("content-type"), Some("application/json"));

        assert!(response(402, "").is_payment_required());
        assert!(!response(302, "").is_success());
    }

    #[test]
    fn test_assert_ok_passes_success() {
        assert!(assert_ok(&response(204, ""), "ctx").is_ok());
    }

    #[test]
    fn test_assert_ok_truncates_body() {
        let long = "x".repeat(2_000);
        let err = assert_ok(&response(500, &long), "API call failed").unwrap_err();
        match err {
            ClientError::Remote {
                status,
                body,
                context,
                url,
                ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), 500);
                assert_eq!(context, "API call failed");
                assert_eq!(url, "http://localhost/api");
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }
}
