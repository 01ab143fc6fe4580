//! # Route Policy
//!
//! Operator-declared routing for one ordered chain pair. Policies are built
//! by the validator in `pgw-crosschain`; a `RoutePolicy` value in a store
//! already satisfies every invariant (distinct endpoints, known default,
//! duplicate-free fallback order).

use serde::{Deserialize, Serialize};

use crate::bridge::{BridgeType, FallbackMode};
use crate::identity::{ChainRecordId, PolicyId};

/// An ordered (source, destination) chain pair. The key of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePair {
    pub source: ChainRecordId,
    pub dest: ChainRecordId,
}

impl RoutePair {
    pub fn new(source: ChainRecordId, dest: ChainRecordId) -> Self {
        Self { source, dest }
    }
}

impl std::fmt::Display for RoutePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.source.as_uuid(), self.dest.as_uuid())
    }
}

/// Stored route policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePolicy {
    pub id: PolicyId,
    pub route: RoutePair,
    pub default_bridge_type: BridgeType,
    #[serde(default)]
    pub fallback_mode: FallbackMode,
    #[serde(default)]
    pub fallback_order: Vec<BridgeType>,
}

impl RoutePolicy {
    /// Protocols this policy relies on, in evaluation order.
    ///
    /// The fallback order as declared, with the default bridge prepended when
    /// the order does not already name it. Never contains duplicates.
    pub fn protocols(&self) -> Vec<BridgeType> {
        let mut out = Vec::with_capacity(self.fallback_order.len() + 1);
        if !self.fallback_order.contains(&self.default_bridge_type) {
            out.push(self.default_bridge_type);
        }
        for bt in &self.fallback_order {
            if !out.contains(bt) {
                out.push(*bt);
            }
        }
        out
    }
}
