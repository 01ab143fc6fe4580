//! # In-Memory Adapter Gateway
//!
//! A complete state machine of gateway and adapter contract storage, for
//! tests and dry runs. Writes persist, so an autofix followed by a re-audit
//! observes its own corrections.
//!
//! Failure injection:
//! - [`InMemoryAdapterGateway::fail_operation`] makes every call of one
//!   operation (e.g. `setLayerZeroConfig`) fail with `Rejected`.
//! - [`InMemoryAdapterGateway::fail_reads_on`] makes every read on one chain
//!   fail with `Unavailable`.
//! - [`InMemoryAdapterGateway::set_latency`] delays every call; a call whose
//!   latency outlives its [`CallContext`] fails with `DeadlineExceeded`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use pgw_core::hex::is_zero;
use pgw_core::{
    BridgeType, Caip2, CcipConfig, HyperbridgeConfig, LayerZeroConfig, PaymentId, ProtocolConfig,
    BRIDGE_TYPE_UNSET_CODE,
};

use crate::context::CallContext;
use crate::error::GatewayError;
use crate::gateway::{ops, AdapterGateway, GatewayTarget, TxReceipt};

/// One call observed by the in-memory gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub chain: Caip2,
    pub dest: Option<String>,
    pub is_write: bool,
}

fn key(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}

/// In-memory gateway and adapter storage, keyed by chain.
#[derive(Debug, Default)]
pub struct InMemoryAdapterGateway {
    defaults: DashMap<(Caip2, String), u8>,
    adapters: DashMap<(Caip2, String, BridgeType), String>,
    configs: DashMap<(Caip2, String, String), ProtocolConfig>,
    route_errors: DashMap<(Caip2, PaymentId), Vec<u8>>,
    failing_ops: DashMap<&'static str, String>,
    failing_read_chains: DashMap<Caip2, String>,
    latency: RwLock<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    tx_counter: AtomicU64,
}

impl InMemoryAdapterGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Seeding (bypasses failure injection and is not recorded) ----------

    /// Set the stored default bridge code for `dest`; `None` stores the unset code.
    pub fn seed_default(&self, chain: &Caip2, dest: &str, bridge: Option<BridgeType>) {
        let code = bridge.map_or(BRIDGE_TYPE_UNSET_CODE, BridgeType::code);
        self.defaults.insert((chain.clone(), key(dest)), code);
    }

    pub fn seed_adapter(&self, chain: &Caip2, dest: &str, bridge: BridgeType, adapter: &str) {
        self.adapters
            .insert((chain.clone(), key(dest), bridge), key(adapter));
    }

    pub fn seed_route_config(&self, chain: &Caip2, adapter: &str, dest: &str, config: ProtocolConfig) {
        self.configs
            .insert((chain.clone(), key(adapter), key(dest)), config);
    }

    pub fn seed_route_error(&self, chain: &Caip2, payment_id: PaymentId, data: Vec<u8>) {
        self.route_errors.insert((chain.clone(), payment_id), data);
    }

    // -- Failure injection ---------------------------------------------------

    /// Fail every call of `operation` (see [`ops`]) with `message`.
    pub fn fail_operation(&self, operation: &'static str, message: impl Into<String>) {
        self.failing_ops.insert(operation, message.into());
    }

    /// Fail every read on `chain` with `message`.
    pub fn fail_reads_on(&self, chain: &Caip2, message: impl Into<String>) {
        self.failing_read_chains.insert(chain.clone(), message.into());
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.failing_ops.clear();
        self.failing_read_chains.clear();
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.write() = latency;
    }

    // -- Inspection ------------------------------------------------------------

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Operation names of the writes received so far, in order.
    pub fn writes(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.is_write)
            .map(|c| c.operation)
            .collect()
    }

    pub fn stored_default(&self, chain: &Caip2, dest: &str) -> Option<BridgeType> {
        self.defaults
            .get(&(chain.clone(), key(dest)))
            .and_then(|code| BridgeType::from_code(*code).ok().flatten())
    }

    // -- Internals ---------------------------------------------------------

    fn enter(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        operation: &'static str,
        dest: Option<&str>,
        is_write: bool,
    ) -> Result<(), GatewayError> {
        self.calls.lock().push(RecordedCall {
            operation,
            chain: target.chain.clone(),
            dest: dest.map(key),
            is_write,
        });

        let latency = *self.latency.read();
        if !latency.is_zero() {
            std::thread::sleep(latency.min(ctx.remaining()));
        }
        ctx.check(operation)?;

        if !is_write {
            if let Some(reason) = self.failing_read_chains.get(&target.chain) {
                return Err(GatewayError::Unavailable {
                    chain: target.chain.to_string(),
                    reason: reason.clone(),
                });
            }
        }
        if let Some(reason) = self.failing_ops.get(operation) {
            return Err(GatewayError::Rejected {
                operation: operation.to_string(),
                reason: reason.clone(),
            });
        }
        tracing::trace!(chain = %target.chain, operation, "in-memory gateway call");
        Ok(())
    }

    fn receipt(&self, target: &GatewayTarget) -> TxReceipt {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        TxReceipt {
            tx_hash: format!("0x{n:064x}"),
            chain: target.chain.clone(),
        }
    }

    fn write_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        operation: &'static str,
        adapter: &str,
        dest: &str,
        config: ProtocolConfig,
    ) -> Result<TxReceipt, GatewayError> {
        self.enter(ctx, target, operation, Some(dest), true)?;
        if is_zero(adapter) {
            return Err(GatewayError::Rejected {
                operation: operation.to_string(),
                reason: "adapter address is zero".to_string(),
            });
        }
        self.configs
            .insert((target.chain.clone(), key(adapter), key(dest)), config);
        Ok(self.receipt(target))
    }
}

impl AdapterGateway for InMemoryAdapterGateway {
    fn default_bridge_type(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
    ) -> Result<Option<BridgeType>, GatewayError> {
        self.enter(ctx, target, ops::DEFAULT_BRIDGE_TYPE, Some(dest), false)?;
        let code = self
            .defaults
            .get(&(target.chain.clone(), key(dest)))
            .map_or(BRIDGE_TYPE_UNSET_CODE, |c| *c);
        BridgeType::from_code(code).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    fn registered_adapter(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
        bridge: BridgeType,
    ) -> Result<Option<String>, GatewayError> {
        self.enter(ctx, target, ops::ADAPTERS, Some(dest), false)?;
        Ok(self
            .adapters
            .get(&(target.chain.clone(), key(dest), bridge))
            .map(|a| a.clone()))
    }

    fn route_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        bridge: BridgeType,
    ) -> Result<Option<ProtocolConfig>, GatewayError> {
        self.enter(ctx, target, ops::ROUTE_CONFIG, Some(dest), false)?;
        Ok(self
            .configs
            .get(&(target.chain.clone(), key(adapter), key(dest)))
            .map(|c| c.clone())
            .filter(|c| c.bridge_type() == bridge))
    }

    fn last_route_error(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        payment_id: &PaymentId,
    ) -> Result<Option<Vec<u8>>, GatewayError> {
        self.enter(ctx, target, ops::LAST_ROUTE_ERROR, None, false)?;
        Ok(self
            .route_errors
            .get(&(target.chain.clone(), *payment_id))
            .map(|d| d.clone())
            .filter(|d| !d.is_empty()))
    }

    fn set_default_bridge_type(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
        bridge: BridgeType,
    ) -> Result<TxReceipt, GatewayError> {
        self.enter(ctx, target, ops::SET_DEFAULT_BRIDGE_TYPE, Some(dest), true)?;
        self.defaults
            .insert((target.chain.clone(), key(dest)), bridge.code());
        Ok(self.receipt(target))
    }

    fn register_adapter(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
        bridge: BridgeType,
        adapter: &str,
    ) -> Result<TxReceipt, GatewayError> {
        self.enter(ctx, target, ops::REGISTER_ADAPTER, Some(dest), true)?;
        if is_zero(adapter) {
            return Err(GatewayError::Rejected {
                operation: ops::REGISTER_ADAPTER.to_string(),
                reason: "adapter address is zero".to_string(),
            });
        }
        self.adapters
            .insert((target.chain.clone(), key(dest), bridge), key(adapter));
        Ok(self.receipt(target))
    }

    fn set_hyperbridge_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        config: &HyperbridgeConfig,
    ) -> Result<TxReceipt, GatewayError> {
        self.write_config(
            ctx,
            target,
            ops::SET_HYPERBRIDGE_CONFIG,
            adapter,
            dest,
            ProtocolConfig::Hyperbridge(config.clone()),
        )
    }

    fn set_ccip_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        config: &CcipConfig,
    ) -> Result<TxReceipt, GatewayError> {
        self.write_config(
            ctx,
            target,
            ops::SET_CCIP_CONFIG,
            adapter,
            dest,
            ProtocolConfig::Ccip(config.clone()),
        )
    }

    fn set_layerzero_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        config: &LayerZeroConfig,
    ) -> Result<TxReceipt, GatewayError> {
        self.write_config(
            ctx,
            target,
            ops::SET_LAYERZERO_CONFIG,
            adapter,
            dest,
            ProtocolConfig::LayerZero(config.clone()),
        )
    }

    fn gateway_name(&self) -> &str {
        "InMemoryAdapterGateway"
    }
}
