//! # Chain Identity
//!
//! A chain is addressed in three interchangeable forms at the boundary: the
//! internal record UUID, a legacy chain id string (e.g. `"8453"`), and a
//! CAIP-2 identifier (`eip155:8453`, `solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp`).
//! [`ChainRecord`] binds the three together.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::ChainRecordId;

/// Virtual-machine family of a chain. Determines address width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// EVM-like chains: 20-byte addresses.
    Evm,
    /// SVM-like chains: 32-byte account keys.
    Svm,
}

impl ChainFamily {
    /// Width of a contract address on this family, in bytes.
    pub fn address_len(self) -> usize {
        match self {
            Self::Evm => 20,
            Self::Svm => 32,
        }
    }

    /// Infer the family from a CAIP-2 namespace, if it is one we know.
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "eip155" => Some(Self::Evm),
            "solana" => Some(Self::Svm),
            _ => None,
        }
    }

    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Evm => "evm",
            Self::Svm => "svm",
        }
    }
}

impl std::fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed CAIP-2 identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Caip2Error {
    /// No `:` separating namespace and reference.
    #[error("CAIP-2 identifier {0:?} is missing the ':' separator")]
    MissingSeparator(String),

    /// Namespace must match `[-a-z0-9]{3,8}`.
    #[error("invalid CAIP-2 namespace {0:?}")]
    InvalidNamespace(String),

    /// Reference must match `[-_a-zA-Z0-9]{1,32}`.
    #[error("invalid CAIP-2 reference {0:?}")]
    InvalidReference(String),
}

/// A validated CAIP-2 chain identifier.
///
/// Construction enforces the namespace and reference grammars, so a `Caip2`
/// value is always well-formed. Serializes as the `namespace:reference` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Caip2 {
    namespace: String,
    reference: String,
}

fn valid_namespace(ns: &str) -> bool {
    (3..=8).contains(&ns.len())
        && ns
            .bytes()
            .all(|b| b == b'-' || b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn valid_reference(r: &str) -> bool {
    (1..=32).contains(&r.len())
        && r
            .bytes()
            .all(|b| b == b'-' || b == b'_' || b.is_ascii_alphanumeric())
}

impl Caip2 {
    /// Build from separate parts.
    ///
    /// # Errors
    ///
    /// Returns [`Caip2Error`] if either part violates its grammar.
    pub fn new(
        namespace: impl Into<String>,
        reference: impl Into<String>,
    ) -> Result<Self, Caip2Error> {
        let namespace = namespace.into();
        let reference = reference.into();
        if !valid_namespace(&namespace) {
            return Err(Caip2Error::InvalidNamespace(namespace));
        }
        if !valid_reference(&reference) {
            return Err(Caip2Error::InvalidReference(reference));
        }
        Ok(Self {
            namespace,
            reference,
        })
    }

    /// Parse `namespace:reference`.
    pub fn parse(input: &str) -> Result<Self, Caip2Error> {
        let trimmed = input.trim();
        let (ns, reference) = trimmed
            .split_once(':')
            .ok_or_else(|| Caip2Error::MissingSeparator(trimmed.to_string()))?;
        Self::new(ns, reference)
    }

    /// Whether `input` looks like a CAIP-2 identifier (contains the separator).
    ///
    /// Legacy chain ids never contain `:`, so this routes resolver input.
    pub fn is_candidate(input: &str) -> bool {
        input.contains(':')
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl std::str::FromStr for Caip2 {
    type Err = Caip2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Caip2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

impl Serialize for Caip2 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Caip2 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Canonical chain registry record. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRecord {
    pub id: ChainRecordId,
    /// Human-readable name ("Base", "Arbitrum One").
    pub name: String,
    pub family: ChainFamily,
    /// Legacy chain id. For EVM chains this is the decimal chain id.
    pub chain_id: String,
    pub caip2: Caip2,
}

impl ChainRecord {
    /// Build a record with a fresh internal id.
    pub fn new(
        name: impl Into<String>,
        family: ChainFamily,
        chain_id: impl Into<String>,
        caip2: Caip2,
    ) -> Self {
        Self {
            id: ChainRecordId::new(),
            name: name.into(),
            family,
            chain_id: chain_id.into(),
            caip2,
        }
    }

    /// Identifier used for this chain in gateway contract calls.
    ///
    /// Contracts key routes by the CAIP-2 string so EVM and SVM destinations
    /// share one namespace.
    pub fn contract_key(&self) -> String {
        self.caip2.to_string()
    }
}
