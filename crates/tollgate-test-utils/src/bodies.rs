//! Builders for `402 Payment Required` bodies.

use serde_json::{json, Value};

/// A CAIP-2 Solana devnet network.
pub const SOLANA_DEVNET: &str = "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1";

/// A CAIP-2 Base mainnet network.
pub const BASE_MAINNET: &str = "eip155:8453";

/// One `accepts` entry paying `amount` minor units on `network`.
pub fn payment_requirement(network: &str, amount: u64) -> Value {
    json!({
        "scheme": "exact",
        "network": network,
        "amount": amount.to_string(),
        "payTo": format!("payee-{}", network),
        "asset": "USDC",
        "maxTimeoutSeconds": 60,
        "extra": {"name": "USDC", "decimals": 6}
    })
}

/// A v2 402 body with the given `accepts` entries.
pub fn payment_required_body(accepts: Vec<Value>) -> Value {
    json!({
        "x402Version": 2,
        "error": "Payment required",
        "accepts": accepts,
    })
}

/// A 402 body with a single Solana requirement.
pub fn solana_payment_required(amount: u64) -> Value {
    payment_required_body(vec![payment_requirement(SOLANA_DEVNET, amount)])
}

/// A 402 body with a single EVM requirement.
pub fn evm_payment_required(amount: u64) -> Value {
    payment_required_body(vec![payment_requirement(BASE_MAINNET, amount)])
}

/// A v1 402 body using `maxAmountRequired` and a bare network name.
pub fn legacy_payment_required(network: &str, amount: u64) -> Value {
    json!({
        "x402Version": 1,
        "accepts": [{
            "scheme": "exact",
            "network": network,
            "maxAmountRequired": amount.to_string(),
            "payTo": "TREASURY",
            "extra": {"feePayer": "FEEPAYER"}
        }]
    })
}
