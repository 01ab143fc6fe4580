//! # Bridge Config Validator
//!
//! Validates and normalizes route-policy and per-protocol config payloads as
//! they arrive from operators. Validation is all-or-nothing: every problem
//! found is collected into one [`ValidationError`] naming each offending
//! field, and nothing from a rejected payload is returned.
//!
//! ## Normalization
//!
//! - Chain identifiers in any form are resolved to internal ids.
//! - Bridge type tokens are parsed leniently (see [`BridgeType::parse`]).
//! - Hex gets a `0x` prefix and lowercase digits. Addresses are left-padded
//!   to the destination family's width; LayerZero peers to 32 bytes.
//! - Omitted LayerZero options become `"0x"`.

use pgw_core::bridge_config::LAYERZERO_PEER_LEN;
use pgw_core::hex::{is_zero, left_pad_hex, normalize_hex};
use pgw_core::{
    BridgeConfig, BridgeType, CcipConfig, ChainRecord, FallbackMode, HyperbridgeConfig,
    LayerZeroConfig, ParseBridgeTypeError, PolicyId, ProtocolConfig, RoutePair, RoutePolicy,
    ValidationError,
};
use serde::{Deserialize, Serialize};

use crate::error::CrosschainError;
use crate::resolver::ChainResolver;

/// A numeric field supplied as a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(u64),
    Text(String),
}

impl NumericInput {
    fn to_u64(&self) -> Result<u64, String> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("{s:?} is not an unsigned integer")),
        }
    }
}

impl From<u64> for NumericInput {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

/// Raw route policy payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePolicyInput {
    pub source_chain_id: String,
    pub dest_chain_id: String,
    #[serde(default)]
    pub default_bridge_type: Option<String>,
    #[serde(default)]
    pub fallback_mode: Option<String>,
    #[serde(default)]
    pub fallback_order: Option<Vec<String>>,
}

/// Raw bridge config payload. Only the fields of the target protocol are read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfigInput {
    pub source_chain_id: String,
    pub dest_chain_id: String,
    #[serde(default)]
    pub is_active: Option<bool>,

    // Hyperbridge
    #[serde(default)]
    pub state_machine_id: Option<String>,
    #[serde(default)]
    pub destination_contract: Option<String>,

    // CCIP
    #[serde(default)]
    pub chain_selector: Option<NumericInput>,
    #[serde(default)]
    pub destination_adapter: Option<String>,

    // LayerZero
    #[serde(default)]
    pub dst_eid: Option<NumericInput>,
    #[serde(default, alias = "peer")]
    pub peer_hex: Option<String>,
    #[serde(default, alias = "options")]
    pub options_hex: Option<String>,
}

/// Route endpoints after resolution; either may be missing if it failed.
struct ResolvedRoute {
    source: Option<ChainRecord>,
    dest: Option<ChainRecord>,
}

impl ResolvedRoute {
    fn pair(&self) -> Option<RoutePair> {
        match (&self.source, &self.dest) {
            (Some(s), Some(d)) => Some(RoutePair::new(s.id, d.id)),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct BridgeConfigValidator {
    resolver: ChainResolver,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl BridgeConfigValidator {
    pub fn new(resolver: ChainResolver) -> Self {
        Self { resolver }
    }

    /// Resolve both endpoints, recording lookup failures as violations.
    /// Store failures abort validation.
    fn resolve_route(
        &self,
        source: &str,
        dest: &str,
        errors: &mut ValidationError,
    ) -> Result<ResolvedRoute, CrosschainError> {
        let mut resolve = |field: &str, input: &str| -> Result<Option<ChainRecord>, CrosschainError> {
            if input.trim().is_empty() {
                errors.push(field, "is required");
                return Ok(None);
            }
            match self.resolver.resolve(input) {
                Ok(rec) => Ok(Some(rec)),
                Err(e @ (CrosschainError::ChainNotFound { .. } | CrosschainError::AmbiguousChain { .. })) => {
                    errors.push(field, e.to_string());
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        };
        let route = ResolvedRoute {
            source: resolve("sourceChainId", source)?,
            dest: resolve("destChainId", dest)?,
        };
        if let (Some(s), Some(d)) = (&route.source, &route.dest) {
            if s.id == d.id {
                errors.push("destChainId", "must differ from sourceChainId");
            }
        }
        Ok(route)
    }

    /// Validate a route policy payload.
    ///
    /// # Errors
    ///
    /// [`CrosschainError::Validation`] listing every violation, or
    /// [`CrosschainError::Store`] if the chain registry fails.
    pub fn validate_route_policy(&self, input: &RoutePolicyInput) -> Result<RoutePolicy, CrosschainError> {
        let mut errors = ValidationError::new();
        let route = self.resolve_route(&input.source_chain_id, &input.dest_chain_id, &mut errors)?;

        let default_bridge_type = match non_empty(&input.default_bridge_type) {
            None => {
                errors.push("defaultBridgeType", "is required");
                None
            }
            Some(raw) => match BridgeType::parse(raw) {
                Ok(bt) => Some(bt),
                Err(ParseBridgeTypeError::Unset) => {
                    errors.push(
                        "defaultBridgeType",
                        "must be a known protocol, not the reserved unset value",
                    );
                    None
                }
                Err(e) => {
                    errors.push("defaultBridgeType", e.to_string());
                    None
                }
            },
        };

        let fallback_mode = match non_empty(&input.fallback_mode) {
            None => FallbackMode::default(),
            Some(raw) => FallbackMode::parse(raw).unwrap_or_else(|| {
                errors.push(
                    "fallbackMode",
                    format!("unknown fallback mode {raw:?}; expected strict or permissive"),
                );
                FallbackMode::default()
            }),
        };

        let mut fallback_order = Vec::new();
        for (i, raw) in input.fallback_order.iter().flatten().enumerate() {
            let field = format!("fallbackOrder[{i}]");
            match BridgeType::parse(raw) {
                Ok(bt) if fallback_order.contains(&bt) => {
                    errors.push(field, format!("duplicate entry {bt}"));
                }
                Ok(bt) => fallback_order.push(bt),
                Err(ParseBridgeTypeError::Unset) => {
                    errors.push(field, "the reserved unset value cannot appear in a fallback order");
                }
                Err(e) => errors.push(field, e.to_string()),
            }
        }

        let (Some(route), Some(default_bridge_type)) = (route.pair(), default_bridge_type) else {
            return Err(errors.into());
        };
        let policy = RoutePolicy {
            id: PolicyId::new(),
            route,
            default_bridge_type,
            fallback_mode,
            fallback_order,
        };
        Ok(errors.into_result(policy)?)
    }

    /// Validate a bridge config payload for `protocol`.
    ///
    /// # Errors
    ///
    /// As [`validate_route_policy`](Self::validate_route_policy).
    pub fn validate_bridge_config(
        &self,
        protocol: BridgeType,
        input: &BridgeConfigInput,
    ) -> Result<BridgeConfig, CrosschainError> {
        let mut errors = ValidationError::new();
        let route = self.resolve_route(&input.source_chain_id, &input.dest_chain_id, &mut errors)?;
        let dest_width = route.dest.as_ref().map(|d| d.family.address_len());

        let config = match protocol {
            BridgeType::Hyperbridge => {
                let state_machine_id = required_blob(&mut errors, "stateMachineId", &input.state_machine_id);
                let destination_contract =
                    address(&mut errors, "destinationContract", &input.destination_contract, dest_width);
                ProtocolConfig::Hyperbridge(HyperbridgeConfig {
                    state_machine_id,
                    destination_contract,
                })
            }
            BridgeType::Ccip => {
                let chain_selector = nonzero(&mut errors, "chainSelector", &input.chain_selector, u64::MAX);
                let destination_adapter =
                    address(&mut errors, "destinationAdapter", &input.destination_adapter, dest_width);
                ProtocolConfig::Ccip(CcipConfig {
                    chain_selector,
                    destination_adapter,
                })
            }
            BridgeType::LayerZero => {
                let dst_eid = nonzero(&mut errors, "dstEid", &input.dst_eid, u64::from(u32::MAX)) as u32;
                let peer = peer(&mut errors, &input.peer_hex);
                let options = match non_empty(&input.options_hex) {
                    None => "0x".to_string(),
                    Some(raw) => normalize_hex(raw).unwrap_or_else(|e| {
                        errors.push("optionsHex", e.to_string());
                        String::new()
                    }),
                };
                ProtocolConfig::LayerZero(LayerZeroConfig {
                    dst_eid,
                    peer,
                    options,
                })
            }
        };

        let Some(route) = route.pair() else {
            return Err(errors.into());
        };
        let config = BridgeConfig {
            is_active: input.is_active.unwrap_or(true),
            ..BridgeConfig::new(route, config)
        };
        Ok(errors.into_result(config)?)
    }
}

fn required_blob(errors: &mut ValidationError, field: &str, value: &Option<String>) -> String {
    let Some(raw) = non_empty(value) else {
        errors.push(field, "is required");
        return String::new();
    };
    match normalize_hex(raw) {
        Ok(hex) if hex == "0x" => {
            errors.push(field, "must not be empty");
            hex
        }
        Ok(hex) => hex,
        Err(e) => {
            errors.push(field, e.to_string());
            String::new()
        }
    }
}

/// Canonical address at `width` bytes. Without a resolved destination the
/// width is unknown, so only hex syntax is checked.
fn address(errors: &mut ValidationError, field: &str, value: &Option<String>, width: Option<usize>) -> String {
    let Some(raw) = non_empty(value) else {
        errors.push(field, "is required");
        return String::new();
    };
    let normalized = match width {
        Some(w) => left_pad_hex(raw, w),
        None => normalize_hex(raw),
    };
    match normalized {
        Ok(hex) if is_zero(&hex) => {
            errors.push(field, "must not be the zero address");
            hex
        }
        Ok(hex) => hex,
        Err(e) => {
            errors.push(field, e.to_string());
            String::new()
        }
    }
}

fn peer(errors: &mut ValidationError, value: &Option<String>) -> String {
    let Some(raw) = non_empty(value) else {
        errors.push("peerHex", "is required");
        return String::new();
    };
    match left_pad_hex(raw, LAYERZERO_PEER_LEN) {
        Ok(hex) if is_zero(&hex) => {
            errors.push("peerHex", "must not be zero");
            hex
        }
        Ok(hex) => hex,
        Err(e) => {
            errors.push("peerHex", e.to_string());
            String::new()
        }
    }
}

fn nonzero(errors: &mut ValidationError, field: &str, value: &Option<NumericInput>, max: u64) -> u64 {
    let Some(raw) = value else {
        errors.push(field, "is required");
        return 0;
    };
    match raw.to_u64() {
        Ok(0) => {
            errors.push(field, "must be non-zero");
            0
        }
        Ok(n) if n > max => {
            errors.push(field, format!("{n} exceeds maximum {max}"));
            0
        }
        Ok(n) => n,
        Err(msg) => {
            errors.push(field, msg);
            0
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use pgw_core::{Caip2, ChainFamily};
    use pgw_registry::InMemoryChainRegistry;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn validator() -> BridgeConfigValidator {
        let reg = Arc::new(InMemoryChainRegistry::new());
        for (name, id) in [("Base", "8453"), ("Arbitrum", "42161")] {
            reg.insert(ChainRecord::new(name, ChainFamily::Evm, id, Caip2::new("eip155", id).unwrap()))
                .unwrap();
        }
        BridgeConfigValidator::new(ChainResolver::new(reg))
    }

    fn bridge_token() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("HYPERBRIDGE".to_string()),
            Just("hyperbridge".to_string()),
            Just("CCIP".to_string()),
            Just("ccip".to_string()),
            Just("LAYERZERO".to_string()),
            Just("layer_zero".to_string()),
            Just("3".to_string()),
        ]
    }

    proptest! {
        /// A fallback order is accepted exactly when its entries are distinct
        /// after canonicalization.
        #[test]
        fn duplicates_are_always_rejected(order in proptest::collection::vec(bridge_token(), 0..6)) {
            let v = validator();
            let input = RoutePolicyInput {
                source_chain_id: "8453".into(),
                dest_chain_id: "42161".into(),
                default_bridge_type: Some("CCIP".into()),
                fallback_mode: None,
                fallback_order: Some(order.clone()),
            };
            let mut seen = Vec::new();
            let mut has_dup = false;
            for raw in &order {
                let bt = BridgeType::parse(raw).unwrap();
                has_dup |= seen.contains(&bt);
                seen.push(bt);
            }
            let result = v.validate_route_policy(&input);
            prop_assert_eq!(result.is_err(), has_dup);
        }
    }
}
