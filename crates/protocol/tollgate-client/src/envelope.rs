//! Uniform result envelope.
//!
//! Every call ends as `{"ok": true, "data": ..., "meta"?: ...}` or
//! `{"ok": false, "error": {"message": ..., "state": ...}}`.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ClientError, ClientResult, TerminalState};
use crate::orchestrator::{CallSuccess, FREE_NOTE};

/// Error part of a failed envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeError {
    /// Human-readable message.
    pub message: String,
    /// Terminal state of the call.
    pub state: TerminalState,
}

/// The JSON envelope returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallEnvelope {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Response data on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Failure details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
    /// Extra information about how the call went.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl CallEnvelope {
    /// A successful envelope.
    pub fn success(data: Value, meta: Option<Value>) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
            meta,
        }
    }

    /// A failed envelope.
    pub fn failure(message: impl Into<String>, state: TerminalState) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(EnvelopeError {
                message: message.into(),
                state,
            }),
            meta: None,
        }
    }

    /// Terminal state recorded in the envelope.
    pub fn state(&self) -> Option<TerminalState> {
        match (&self.error, &self.meta) {
            (Some(error), _) => Some(error.state),
            (None, Some(meta)) => meta
                .get("state")
                .and_then(Value::as_str)
                .and_then(|s| match s {
                    "FREE_OK" => Some(TerminalState::FreeOk),
                    "PAID_OK" => Some(TerminalState::PaidOk),
                    _ => None,
                }),
            (None, None) => None,
        }
    }

    /// Pretty JSON text.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.fallback_json())
    }

    fn fallback_json(&self) -> String {
        json!({"ok": self.ok}).to_string()
    }
}

impl From<CallSuccess> for CallEnvelope {
    fn from(success: CallSuccess) -> Self {
        let meta = match &success.payment {
            Some(receipt) => json!({
                "state": success.state,
                "url": success.url,
                "payment": receipt,
            }),
            None => json!({
                "state": success.state,
                "url": success.url,
                "note": FREE_NOTE,
            }),
        };
        Self::success(success.data, Some(meta))
    }
}

impl From<&ClientError> for CallEnvelope {
    fn from(error: &ClientError) -> Self {
        Self::failure(error.to_string(), error.terminal_state())
    }
}

impl From<ClientResult<CallSuccess>> for CallEnvelope {
    fn from(result: ClientResult<CallSuccess>) -> Self {
        match result {
            Ok(success) => success.into(),
            Err(e) => (&e).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_envelope() {
        let envelope = CallEnvelope::from(CallSuccess {
            state: TerminalState::FreeOk,
            url: "http://x/api/link/a".into(),
            data: json!({"hello": "world"}),
            payment: None,
        });

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["hello"], "world");
        assert_eq!(value["meta"]["note"], FREE_NOTE);
        assert_eq!(value["meta"]["state"], "FREE_OK");
        assert!(value.get("error").is_none());
        assert_eq!(envelope.state(), Some(TerminalState::FreeOk));
    }

    #[test]
    fn test_error_envelope() {
        let err = ClientError::NoObligation;
        let envelope = CallEnvelope::from(&err);

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["state"], "NO_OBLIGATION");
        assert_eq!(
            value["error"]["message"],
            "402 response missing payment requirements in body"
        );
        assert!(value.get("data").is_none());
        assert_eq!(envelope.state(), Some(TerminalState::NoObligation));
    }

    #[test]
    fn test_pretty_json() {
        let text = CallEnvelope::success(json!(1), None).to_json_pretty();
        assert!(text.contains("\"ok\": true"));
        assert!(!text.contains("meta"));
    }
}
