//! # Crosschain Error Types
//!
//! One error enum for every engine operation. Validation failures are never
//! retried; store and gateway failures carry the upstream message verbatim.

use pgw_core::ValidationError;
use pgw_onchain::GatewayError;
use pgw_registry::StoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrosschainError {
    /// No chain matches the identifier in any of its three forms.
    #[error("chain not found: {input}")]
    ChainNotFound { input: String },

    /// The identifier matched different chains through different forms.
    #[error("chain identifier {input:?} is ambiguous: matches {}", .candidates.join(", "))]
    AmbiguousChain {
        input: String,
        candidates: Vec<String>,
    },

    /// A required record does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    #[error("gateway failure: {0}")]
    Gateway(#[from] GatewayError),
}

/// Invalid engine configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
}
