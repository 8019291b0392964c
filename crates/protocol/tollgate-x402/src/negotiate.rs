//! Obligation selection.
//!
//! Turns a 402 body into the single [`PaymentObligation`] the client will
//! try to pay, honouring the caller's preferred chain namespace.

use serde_json::Value;
use tollgate_types::ChainNamespace;
use tracing::{debug, warn};

use crate::error::{X402Error, X402Result};
use crate::types::{PaymentObligation, PaymentRequired, PaymentRequirement, ASSUMED_ASSET_DECIMALS};

/// Parse a 402 response body.
///
/// Best-effort: an empty or non-JSON body yields an empty candidate set,
/// and `accepts` entries that are not JSON objects are skipped.
pub fn parse_payment_required(bytes: &[u8]) -> PaymentRequired {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        debug!("402 response has an empty body");
        return PaymentRequired::default();
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => payment_required_from_value(&value),
        Err(e) => {
            debug!(error = %e, "402 response body is not JSON");
            PaymentRequired::default()
        }
    }
}

/// Extract payment requirements from an already-parsed 402 body.
pub fn payment_required_from_value(value: &Value) -> PaymentRequired {
    let accepts = value
        .get("accepts")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| {
                    if !entry.is_object() {
                        debug!(index, "Skipping payment requirement that is not an object");
                        return None;
                    }
                    match serde_json::from_value::<PaymentRequirement>(entry.clone()) {
                        Ok(req) => Some(req),
                        Err(e) => {
                            debug!(index, error = %e, "Skipping malformed payment requirement");
                            None
                        }
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    PaymentRequired {
        x402_version: value.get("x402Version").and_then(Value::as_u64),
        accepts,
        resource: value.get("resource").cloned(),
        error: value.get("error").and_then(Value::as_str).map(str::to_string),
    }
}

/// Pick the requirement to pay.
///
/// The first candidate in the preferred namespace wins; otherwise the
/// first candidate overall.
pub fn select_requirement<'a>(
    body: &'a PaymentRequired,
    preferred: &ChainNamespace,
) -> X402Result<&'a PaymentRequirement> {
    body.accepts
        .iter()
        .find(|req| preferred.matches(&req.network))
        .or_else(|| body.accepts.first())
        .ok_or(X402Error::NoObligation)
}

/// Select and validate the obligation to pay.
pub fn select_obligation(
    body: &PaymentRequired,
    preferred: &ChainNamespace,
) -> X402Result<PaymentObligation> {
    let req = select_requirement(body, preferred)?;
    let amount_minor_units = parse_amount(req.raw_amount())?;

    if let Some(decimals) = req.declared_decimals() {
        if decimals != ASSUMED_ASSET_DECIMALS {
            warn!(
                network = %req.network,
                decimals,
                "Asset declares non-USDC decimals; price is still read as 6 decimals"
            );
        }
    }

    // a blank network gives no hint, so the caller's preference decides
    let namespace = if req.network.trim().is_empty() {
        preferred.clone()
    } else {
        req.namespace()
    };

    let obligation = PaymentObligation {
        scheme: req.scheme.clone(),
        network: req.network.clone(),
        namespace,
        amount_minor_units,
        pay_to: req.pay_to.clone(),
        asset: req.asset.clone(),
        max_timeout_seconds: req.max_timeout_seconds,
        extra: req.extra.clone(),
    };

    debug!(
        network = %obligation.network,
        namespace = %obligation.namespace,
        amount = obligation.amount_minor_units,
        price_usd = %obligation.price_usd(),
        "Selected payment obligation"
    );

    Ok(obligation)
}

/// Parse an amount in minor units from a string or JSON number.
///
/// Missing, non-numeric, fractional, zero or negative values are rejected.
pub fn parse_amount(raw: Option<&Value>) -> X402Result<u64> {
    let raw = raw.ok_or_else(|| X402Error::invalid_amount(None::<String>))?;
    let parsed = match raw {
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f > 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        _ => None,
    };
    match parsed {
        Some(amount) if amount > 0 => Ok(amount),
        _ => Err(X402Error::invalid_amount(Some(raw_to_string(raw)))),
    }
}

fn raw_to_string(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
