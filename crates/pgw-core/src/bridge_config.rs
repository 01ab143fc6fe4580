//! # Per-Protocol Bridge Configuration
//!
//! Each bridge protocol needs its own on-chain route registration. The
//! payloads differ per protocol, so they form a closed tagged union,
//! [`ProtocolConfig`], keyed by bridge type. The audit engine compares a
//! stored config against the adapter's on-chain config with
//! [`ProtocolConfig::diff`]; the autofix orchestrator switches on the tag to
//! pick the correcting operation.
//!
//! Hex fields held here are canonical (see [`crate::hex`]): addresses
//! left-padded to the destination family width, LayerZero peers to 32 bytes,
//! empty LayerZero options as `"0x"`.

use serde::{Deserialize, Serialize};

use crate::bridge::BridgeType;
use crate::hex::hex_eq;
use crate::identity::BridgeConfigId;
use crate::policy::RoutePair;

/// Byte width of a LayerZero peer.
pub const LAYERZERO_PEER_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperbridgeConfig {
    /// Opaque state-machine identifier of the destination.
    pub state_machine_id: String,
    /// Receiving contract on the destination chain.
    pub destination_contract: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CcipConfig {
    /// CCIP destination chain selector. Never zero.
    pub chain_selector: u64,
    pub destination_adapter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerZeroConfig {
    /// LayerZero destination endpoint id. Never zero.
    pub dst_eid: u32,
    /// Remote peer, 32 bytes.
    pub peer: String,
    /// Executor options; `"0x"` when none.
    pub options: String,
}

/// Protocol-specific route configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "bridgeType")]
pub enum ProtocolConfig {
    #[serde(rename = "HYPERBRIDGE")]
    Hyperbridge(HyperbridgeConfig),
    #[serde(rename = "CCIP")]
    Ccip(CcipConfig),
    #[serde(rename = "LAYERZERO")]
    LayerZero(LayerZeroConfig),
}

impl ProtocolConfig {
    pub fn bridge_type(&self) -> BridgeType {
        match self {
            Self::Hyperbridge(_) => BridgeType::Hyperbridge,
            Self::Ccip(_) => BridgeType::Ccip,
            Self::LayerZero(_) => BridgeType::LayerZero,
        }
    }

    /// Names of the fields where `self` and `other` disagree.
    ///
    /// Hex fields compare case-insensitively. Configs of different protocols
    /// differ in `bridgeType` only.
    pub fn diff(&self, other: &ProtocolConfig) -> Vec<&'static str> {
        let mut fields = Vec::new();
        match (self, other) {
            (Self::Hyperbridge(a), Self::Hyperbridge(b)) => {
                if !hex_eq(&a.state_machine_id, &b.state_machine_id) {
                    fields.push("stateMachineId");
                }
                if !hex_eq(&a.destination_contract, &b.destination_contract) {
                    fields.push("destinationContract");
                }
            }
            (Self::Ccip(a), Self::Ccip(b)) => {
                if a.chain_selector != b.chain_selector {
                    fields.push("chainSelector");
                }
                if !hex_eq(&a.destination_adapter, &b.destination_adapter) {
                    fields.push("destinationAdapter");
                }
            }
            (Self::LayerZero(a), Self::LayerZero(b)) => {
                if a.dst_eid != b.dst_eid {
                    fields.push("dstEid");
                }
                if !hex_eq(&a.peer, &b.peer) {
                    fields.push("peer");
                }
                if !hex_eq(&a.options, &b.options) {
                    fields.push("options");
                }
            }
            _ => fields.push("bridgeType"),
        }
        fields
    }
}

/// Stored bridge configuration for one route and protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    pub id: BridgeConfigId,
    pub route: RoutePair,
    pub config: ProtocolConfig,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl BridgeConfig {
    /// Active config with a fresh id.
    pub fn new(route: RoutePair, config: ProtocolConfig) -> Self {
        Self {
            id: BridgeConfigId::new(),
            route,
            config,
            is_active: true,
        }
    }

    pub fn bridge_type(&self) -> BridgeType {
        self.config.bridge_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lz(eid: u32, peer: &str) -> ProtocolConfig {
        ProtocolConfig::LayerZero(LayerZeroConfig {
            dst_eid: eid,
            peer: peer.into(),
            options: "0x".into(),
        })
    }

    #[test]
    fn identical_configs_have_no_diff() {
        let a = lz(30110, "0xab");
        assert!(a.diff(&a.clone()).is_empty());
    }

    #[test]
    fn hex_fields_compare_case_insensitively() {
        assert!(lz(1, "0xABCD").diff(&lz(1, "0xabcd")).is_empty());
    }

    #[test]
    fn diff_names_each_field() {
        assert_eq!(lz(1, "0x01").diff(&lz(2, "0x02")), vec!["dstEid", "peer"]);

        let a = ProtocolConfig::Ccip(CcipConfig {
            chain_selector: 1,
            destination_adapter: "0x01".into(),
        });
        let b = ProtocolConfig::Ccip(CcipConfig {
            chain_selector: 1,
            destination_adapter: "0x02".into(),
        });
        assert_eq!(a.diff(&b), vec!["destinationAdapter"]);
    }

    #[test]
    fn cross_protocol_diff_is_bridge_type() {
        let h = ProtocolConfig::Hyperbridge(HyperbridgeConfig {
            state_machine_id: "0x01".into(),
            destination_contract: "0x02".into(),
        });
        assert_eq!(h.diff(&lz(1, "0x01")), vec!["bridgeType"]);
    }

    #[test]
    fn serde_is_tagged_by_bridge_type() {
        let v = serde_json::to_value(lz(30110, "0x01")).unwrap();
        assert_eq!(v["bridgeType"], "LAYERZERO");
        assert_eq!(v["dstEid"], 30110);
        let back: ProtocolConfig = serde_json::from_value(v).unwrap();
        assert_eq!(back.bridge_type(), BridgeType::LayerZero);
    }
}
