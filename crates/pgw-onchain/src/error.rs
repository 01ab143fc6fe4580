//! Gateway error type.

use thiserror::Error;

/// Failure of an on-chain read or write.
///
/// Every variant carries the upstream message so the engine can surface it
/// verbatim in check items and autofix steps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The operation's deadline passed before the call completed.
    #[error("deadline exceeded during {operation}")]
    DeadlineExceeded { operation: String },

    /// The chain endpoint could not be reached or answered garbage.
    #[error("chain {chain} unavailable: {reason}")]
    Unavailable { chain: String, reason: String },

    /// The chain accepted the call but it failed (revert, RPC error).
    #[error("{operation} rejected: {reason}")]
    Rejected { operation: String, reason: String },

    /// The gateway implementation cannot serve this chain.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Returned data could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),
}

impl From<crate::abi::AbiError> for GatewayError {
    fn from(err: crate::abi::AbiError) -> Self {
        Self::Decode(err.to_string())
    }
}
