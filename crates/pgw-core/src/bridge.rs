//! # Bridge Protocols
//!
//! The closed set of bridging protocols a route can use, their on-chain code
//! table, and the fallback mode governing how a route moves down its
//! fallback order.
//!
//! ## On-chain codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | unset (reserved, never a valid policy value) |
//! | 1 | `HYPERBRIDGE` |
//! | 2 | `CCIP` |
//! | 3 | `LAYERZERO` |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::ContractType;

/// On-chain code a gateway reports when no default bridge is set.
pub const BRIDGE_TYPE_UNSET_CODE: u8 = 0;

/// A bridging protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BridgeType {
    Hyperbridge,
    Ccip,
    LayerZero,
}

/// Failure to interpret a bridge type token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseBridgeTypeError {
    /// The reserved none/unset value. Valid on-chain, never as a policy value.
    #[error("bridge type is unset")]
    Unset,

    #[error("unknown bridge type {0:?}")]
    Unknown(String),

    #[error("unknown on-chain bridge type code {0}")]
    UnknownCode(u8),
}

impl BridgeType {
    /// Every protocol, in code order.
    pub const ALL: [BridgeType; 3] = [Self::Hyperbridge, Self::Ccip, Self::LayerZero];

    /// Wire name (`HYPERBRIDGE`, `CCIP`, `LAYERZERO`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hyperbridge => "HYPERBRIDGE",
            Self::Ccip => "CCIP",
            Self::LayerZero => "LAYERZERO",
        }
    }

    /// Parse a user-supplied token.
    ///
    /// Case-insensitive; `_` and `-` are ignored so `layer_zero` and
    /// `Layer-Zero` both parse. Numeric codes `1`–`3` are accepted. The
    /// reserved tokens `0`, `none`, and `unset` yield
    /// [`ParseBridgeTypeError::Unset`] so callers can report them distinctly.
    pub fn parse(input: &str) -> Result<Self, ParseBridgeTypeError> {
        let token: String = input
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match token.as_str() {
            "HYPERBRIDGE" | "1" => Ok(Self::Hyperbridge),
            "CCIP" | "2" => Ok(Self::Ccip),
            "LAYERZERO" | "3" => Ok(Self::LayerZero),
            "0" | "NONE" | "UNSET" | "" => Err(ParseBridgeTypeError::Unset),
            _ => Err(ParseBridgeTypeError::Unknown(input.trim().to_string())),
        }
    }

    /// On-chain `uint8` code.
    pub fn code(self) -> u8 {
        match self {
            Self::Hyperbridge => 1,
            Self::Ccip => 2,
            Self::LayerZero => 3,
        }
    }

    /// Interpret an on-chain code. `Ok(None)` is the reserved unset value.
    pub fn from_code(code: u8) -> Result<Option<Self>, ParseBridgeTypeError> {
        match code {
            BRIDGE_TYPE_UNSET_CODE => Ok(None),
            1 => Ok(Some(Self::Hyperbridge)),
            2 => Ok(Some(Self::Ccip)),
            3 => Ok(Some(Self::LayerZero)),
            other => Err(ParseBridgeTypeError::UnknownCode(other)),
        }
    }

    /// Registry type of the adapter contract serving this protocol.
    pub fn adapter_contract_type(self) -> ContractType {
        match self {
            Self::Hyperbridge => ContractType::HyperbridgeAdapter,
            Self::Ccip => ContractType::CcipAdapter,
            Self::LayerZero => ContractType::LayerZeroAdapter,
        }
    }

    /// Name of the corrective operation that writes this protocol's route config.
    pub fn config_step_name(self) -> &'static str {
        match self {
            Self::Hyperbridge => "setHyperbridgeConfig",
            Self::Ccip => "setCCIPConfig",
            Self::LayerZero => "setLayerZeroConfig",
        }
    }
}

impl std::fmt::Display for BridgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BridgeType {
    type Err = ParseBridgeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for BridgeType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BridgeType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// How a route proceeds when the active protocol fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Stop at the first failure.
    #[default]
    Strict,
    /// Keep trying the remaining protocols in fallback order.
    Permissive,
}

impl FallbackMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Permissive => "permissive",
        }
    }

    /// Parse `strict` or `permissive`, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "permissive" => Some(Self::Permissive),
            _ => None,
        }
    }
}

impl std::fmt::Display for FallbackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
