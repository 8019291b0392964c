//! x402 protocol types, client side.
//!
//! Only the fields a paying client needs are modelled. Everything is
//! lenient: x402 v1 and v2 servers disagree on field names and on whether
//! amounts are strings or numbers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tollgate_types::{ChainNamespace, UsdAmount, MICROS_PER_USD};

/// HTTP header carrying the payment proof on the paid retry.
pub const HEADER_PAYMENT_SIGNATURE: &str = "payment-signature";

/// Decimal places assumed for every payment asset (USDC).
pub const ASSUMED_ASSET_DECIMALS: u64 = 6;

/// Minor units per USD under the 6-decimal assumption.
pub const MINOR_UNITS_PER_USD: u64 = 1_000_000;

// =============================================================================
// 402 Response Body
// =============================================================================

/// Body of a `402 Payment Required` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    /// Protocol version, when the server states one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x402_version: Option<u64>,

    /// Candidate payment requirements, in server order.
    #[serde(default)]
    pub accepts: Vec<PaymentRequirement>,

    /// Resource description (a URL string in v1, an object in v2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    /// Server-provided error text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PaymentRequired {
    /// Whether the body carried no candidates at all.
    pub fn is_empty(&self) -> bool {
        self.accepts.is_empty()
    }
}

/// One entry of `accepts`, as sent by the server.
///
/// Fields of the wrong JSON type read as absent, so a quirk in one field
/// never hides the entry from selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirement {
    /// Payment scheme (e.g. "exact").
    #[serde(default, deserialize_with = "lenient_string")]
    pub scheme: String,

    /// Network identifier, CAIP-2 (`eip155:8453`) or a v1 name (`base`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub network: String,

    /// Amount in minor units (v2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,

    /// Amount in minor units (v1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount_required: Option<Value>,

    /// Recipient address.
    #[serde(default, deserialize_with = "lenient_string")]
    pub pay_to: String,

    /// Asset identifier (token mint or contract).
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub asset: Option<String>,

    /// Seconds the payment stays valid.
    #[serde(
        default,
        deserialize_with = "lenient_opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_timeout_seconds: Option<u64>,

    /// Scheme-specific metadata.
    #[serde(
        default,
        deserialize_with = "lenient_opt_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub extra: Option<Map<String, Value>>,
}

impl PaymentRequirement {
    /// Chain namespace of this requirement.
    pub fn namespace(&self) -> ChainNamespace {
        ChainNamespace::from_network(&self.network)
    }

    /// The advertised amount, preferring `amount` over `maxAmountRequired`.
    ///
    /// Empty strings and nulls count as absent, so a blank `amount` falls
    /// back to the legacy field.
    pub fn raw_amount(&self) -> Option<&Value> {
        [self.amount.as_ref(), self.max_amount_required.as_ref()]
            .into_iter()
            .flatten()
            .find(|v| !is_blank(v))
    }

    /// Decimals declared in `extra.decimals`, if any.
    pub fn declared_decimals(&self) -> Option<u64> {
        let value = self.extra.as_ref()?.get("decimals")?;
        match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_opt_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Map<String, Value>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => Some(map),
        _ => None,
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

// =============================================================================
// Payment Obligation
// =============================================================================

/// A single payment the client has decided to make.
///
/// Derived from one [`PaymentRequirement`]; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentObligation {
    /// Payment scheme.
    pub scheme: String,

    /// Full network identifier as sent by the server.
    pub network: String,

    /// Chain family the signing wallet must belong to.
    pub namespace: ChainNamespace,

    /// Amount in the asset's smallest unit. Always positive.
    pub amount_minor_units: u64,

    /// Recipient address.
    pub pay_to: String,

    /// Asset identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,

    /// Seconds the payment stays valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_timeout_seconds: Option<u64>,

    /// Scheme-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,
}

impl PaymentObligation {
    /// Price in USD, assuming 6 decimals.
    pub fn price_usd(&self) -> UsdAmount {
        let micros = u128::from(self.amount_minor_units) * u128::from(MICROS_PER_USD)
            / u128::from(MINOR_UNITS_PER_USD);
        UsdAmount::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_requirement_deserialize_v2() {
        let req: PaymentRequirement = serde_json::from_value(json!({
            "scheme": "exact",
            "network": "eip155:8453",
            "amount": "10000",
            "payTo": "0xabc",
            "asset": "0xusdc",
            "maxTimeoutSeconds": 60,
            "extra": {"name": "USDC", "decimals": 6}
        }))
        .unwrap();

        assert_eq!(req.namespace(), ChainNamespace::eip155());
        assert_eq!(req.raw_amount(), Some(&json!("10000")));
        assert_eq!(req.declared_decimals(), Some(6));
        assert_eq!(req.max_timeout_seconds, Some(60));
    }

    #[test]
    fn test_requirement_legacy_amount_fallback() {
        let req: PaymentRequirement = serde_json::from_value(json!({
            "scheme": "exact",
            "network": "base",
            "amount": "",
            "maxAmountRequired": "5000",
            "payTo": "0xabc"
        }))
        .unwrap();

        assert_eq!(req.raw_amount(), Some(&json!("5000")));
        assert_eq!(req.namespace(), ChainNamespace::eip155());
    }

    #[test]
    fn test_requirement_missing_fields_default() {
        let req: PaymentRequirement = serde_json::from_value(json!({})).unwrap();
        assert!(req.raw_amount().is_none());
        assert!(req.declared_decimals().is_none());
        assert!(req.network.is_empty());
    }

    #[test]
    fn test_requirement_tolerates_wrong_field_types() {
        let req: PaymentRequirement = serde_json::from_value(json!({
            "scheme": "exact",
            "network": "eip155:8453",
            "amount": "10000",
            "payTo": null,
            "asset": 7,
            "maxTimeoutSeconds": "60",
            "extra": "USDC"
        }))
        .unwrap();

        assert_eq!(req.network, "eip155:8453");
        assert_eq!(req.raw_amount(), Some(&json!("10000")));
        assert_eq!(req.pay_to, "");
        assert!(req.asset.is_none());
        assert_eq!(req.max_timeout_seconds, Some(60));
        assert!(req.extra.is_none());
    }

    #[test]
    fn test_obligation_price() {
        let obligation = PaymentObligation {
            scheme: "exact".into(),
            network: "solana:devnet".into(),
            namespace: ChainNamespace::solana(),
            amount_minor_units: 10_000,
            pay_to: "payee".into(),
            asset: None,
            max_timeout_seconds: None,
            extra: None,
        };
        assert_eq!(obligation.price_usd().to_string(), "$0.01");
    }
}
