//! Chain namespaces.
//!
//! x402 v2 identifies networks with CAIP-2 strings (`solana:devnet`,
//! `eip155:8453`); the namespace is the part before the colon. x402 v1
//! used bare names (`base-sepolia`, `solana-devnet`) which are mapped to
//! their chain family here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Solana-family namespace.
pub const NAMESPACE_SOLANA: &str = "solana";

/// EVM-family namespace (CAIP-2 `eip155`).
pub const NAMESPACE_EIP155: &str = "eip155";

/// Legacy x402 v1 network names and their chain family.
const LEGACY_NETWORKS: &[(&str, &str)] = &[
    ("solana", NAMESPACE_SOLANA),
    ("solana-devnet", NAMESPACE_SOLANA),
    ("base", NAMESPACE_EIP155),
    ("base-sepolia", NAMESPACE_EIP155),
    ("avalanche", NAMESPACE_EIP155),
    ("avalanche-fuji", NAMESPACE_EIP155),
    ("polygon", NAMESPACE_EIP155),
    ("polygon-amoy", NAMESPACE_EIP155),
    ("sei", NAMESPACE_EIP155),
    ("sei-testnet", NAMESPACE_EIP155),
    ("iotex", NAMESPACE_EIP155),
];

/// Identifier for a blockchain family that a wallet or obligation belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainNamespace(String);

impl ChainNamespace {
    /// The Solana namespace.
    pub fn solana() -> Self {
        Self(NAMESPACE_SOLANA.to_string())
    }

    /// The EVM (`eip155`) namespace.
    pub fn eip155() -> Self {
        Self(NAMESPACE_EIP155.to_string())
    }

    /// Derive the namespace of an x402 network identifier.
    pub fn from_network(network: &str) -> Self {
        let network = network.trim();
        if let Some((prefix, _)) = network.split_once(':') {
            return Self(prefix.to_ascii_lowercase());
        }
        let lowered = network.to_ascii_lowercase();
        LEGACY_NETWORKS
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, family)| Self(family.to_string()))
            .unwrap_or(Self(lowered))
    }

    /// Whether `network` belongs to this namespace.
    pub fn matches(&self, network: &str) -> bool {
        Self::from_network(network) == *self
    }

    /// The namespace as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChainNamespace {
    type Err = TypesError;

    /// Parses a namespace or a user-facing alias (`evm`, `base`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "" => Err(TypesError::EmptyNamespace),
            "evm" | NAMESPACE_EIP155 => Ok(Self::eip155()),
            other => Ok(Self::from_network(other)),
        }
    }
}
