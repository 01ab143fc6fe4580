//! Deployed contract metadata: the gateway on each chain and the per-protocol
//! adapters it dispatches to.

use serde::{Deserialize, Serialize};

use crate::bridge::BridgeType;
use crate::identity::{ChainRecordId, ContractId};

/// Role of a deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    /// Payment gateway; holds default bridge types and adapter registrations.
    Gateway,
    HyperbridgeAdapter,
    CcipAdapter,
    LayerZeroAdapter,
}

impl ContractType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "GATEWAY",
            Self::HyperbridgeAdapter => "HYPERBRIDGE_ADAPTER",
            Self::CcipAdapter => "CCIP_ADAPTER",
            Self::LayerZeroAdapter => "LAYER_ZERO_ADAPTER",
        }
    }

    /// Protocol an adapter serves; `None` for the gateway.
    pub fn bridge_type(self) -> Option<BridgeType> {
        match self {
            Self::Gateway => None,
            Self::HyperbridgeAdapter => Some(BridgeType::Hyperbridge),
            Self::CcipAdapter => Some(BridgeType::Ccip),
            Self::LayerZeroAdapter => Some(BridgeType::LayerZero),
        }
    }
}

impl std::fmt::Display for ContractType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contract deployed on one chain.
///
/// `address` is canonical hex at the chain family's address width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartContractRecord {
    pub id: ContractId,
    pub chain: ChainRecordId,
    pub contract_type: ContractType,
    pub address: String,
    /// Superseded deployments stay on record but are not `active`.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl SmartContractRecord {
    /// Active record with a fresh id.
    pub fn new(chain: ChainRecordId, contract_type: ContractType, address: impl Into<String>) -> Self {
        Self {
            id: ContractId::new(),
            chain,
            contract_type,
            address: address.into(),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_types_map_to_protocols() {
        for bt in BridgeType::ALL {
            assert_eq!(bt.adapter_contract_type().bridge_type(), Some(bt));
        }
        assert_eq!(ContractType::Gateway.bridge_type(), None);
    }

    #[test]
    fn serde_wire_names_match_as_str() {
        for ct in [
            ContractType::Gateway,
            ContractType::HyperbridgeAdapter,
            ContractType::CcipAdapter,
            ContractType::LayerZeroAdapter,
        ] {
            let json = serde_json::to_string(&ct).unwrap();
            assert_eq!(json, format!("\"{}\"", ct.as_str()));
        }
    }

    #[test]
    fn is_active_defaults_true() {
        let json = format!(
            r#"{{"id":"{}","chain":"{}","contractType":"GATEWAY","address":"0x01"}}"#,
            uuid::Uuid::nil(),
            uuid::Uuid::nil()
        );
        let rec: SmartContractRecord = serde_json::from_str(&json).unwrap();
        assert!(rec.is_active);
    }
}
