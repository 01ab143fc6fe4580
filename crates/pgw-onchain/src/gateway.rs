//! # Adapter Gateway Interface
//!
//! The engine's only view of on-chain state. Reads return what the gateway
//! and adapter contracts currently hold; writes submit the corrective calls
//! the autofix orchestrator plans. Every call receives the operation's
//! [`CallContext`] and must give up once its deadline passes.

use pgw_core::{
    BridgeType, Caip2, CcipConfig, ChainFamily, HyperbridgeConfig, LayerZeroConfig, PaymentId,
    ProtocolConfig,
};
use serde::{Deserialize, Serialize};

use crate::context::CallContext;
use crate::error::GatewayError;

/// Contract-level operation names, used in logs, errors, and failure injection.
pub mod ops {
    pub const DEFAULT_BRIDGE_TYPE: &str = "defaultBridgeTypes";
    pub const ADAPTERS: &str = "adapters";
    pub const ROUTE_CONFIG: &str = "routeConfig";
    pub const LAST_ROUTE_ERROR: &str = "lastRouteError";
    pub const SET_DEFAULT_BRIDGE_TYPE: &str = "setDefaultBridgeType";
    pub const REGISTER_ADAPTER: &str = "registerAdapter";
    pub const SET_HYPERBRIDGE_CONFIG: &str = "setHyperbridgeConfig";
    pub const SET_CCIP_CONFIG: &str = "setCCIPConfig";
    pub const SET_LAYERZERO_CONFIG: &str = "setLayerZeroConfig";
}

/// The gateway contract on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayTarget {
    pub chain: Caip2,
    pub family: ChainFamily,
    /// Canonical hex address of the gateway contract.
    pub gateway_address: String,
}

/// Acknowledgement of a submitted write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_hash: String,
    pub chain: Caip2,
}

/// On-chain reads and corrective writes against gateway and adapter contracts.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc`. The trait is object-safe to support runtime selection (in-memory
/// vs. live RPC). `dest` is always the destination chain's contract key
/// (its CAIP-2 string).
pub trait AdapterGateway: Send + Sync {
    /// Default bridge type the gateway uses for `dest`. `None` is the
    /// reserved unset code.
    fn default_bridge_type(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
    ) -> Result<Option<BridgeType>, GatewayError>;

    /// Adapter address registered for (`dest`, `bridge`), if any.
    fn registered_adapter(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
        bridge: BridgeType,
    ) -> Result<Option<String>, GatewayError>;

    /// Route configuration held by the adapter at `adapter` for `dest`.
    /// `None` when the adapter has nothing configured.
    fn route_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        bridge: BridgeType,
    ) -> Result<Option<ProtocolConfig>, GatewayError>;

    /// Last route failure the gateway recorded for a payment.
    fn last_route_error(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        payment_id: &PaymentId,
    ) -> Result<Option<Vec<u8>>, GatewayError>;

    fn set_default_bridge_type(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
        bridge: BridgeType,
    ) -> Result<TxReceipt, GatewayError>;

    fn register_adapter(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
        bridge: BridgeType,
        adapter: &str,
    ) -> Result<TxReceipt, GatewayError>;

    fn set_hyperbridge_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        config: &HyperbridgeConfig,
    ) -> Result<TxReceipt, GatewayError>;

    fn set_ccip_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        config: &CcipConfig,
    ) -> Result<TxReceipt, GatewayError>;

    fn set_layerzero_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        config: &LayerZeroConfig,
    ) -> Result<TxReceipt, GatewayError>;

    /// Human-readable implementation name (e.g. "InMemoryAdapterGateway").
    fn gateway_name(&self) -> &str;
}

/// Write the route config for whichever protocol `config` belongs to.
///
/// Dispatches on the tag of the closed [`ProtocolConfig`] union.
pub fn apply_route_config(
    gateway: &dyn AdapterGateway,
    ctx: &CallContext,
    target: &GatewayTarget,
    adapter: &str,
    dest: &str,
    config: &ProtocolConfig,
) -> Result<TxReceipt, GatewayError> {
    match config {
        ProtocolConfig::Hyperbridge(c) => gateway.set_hyperbridge_config(ctx, target, adapter, dest, c),
        ProtocolConfig::Ccip(c) => gateway.set_ccip_config(ctx, target, adapter, dest, c),
        ProtocolConfig::LayerZero(c) => gateway.set_layerzero_config(ctx, target, adapter, dest, c),
    }
}
