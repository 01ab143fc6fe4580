//! # Config Audit Engine
//!
//! Compares a route's declared policy and stored bridge configs against what
//! the source chain's gateway and adapters actually hold, and classifies every
//! discrepancy as a [`ContractConfigCheckItem`].
//!
//! ## Checks, in report order
//!
//! 1. Route policy exists (`POLICY_MISSING`).
//! 2. Gateway contract recorded on each leg (`CONTRACT_MISSING`).
//! 3. On-chain default bridge type equals the policy default
//!    (`DEFAULT_BRIDGE_MISMATCH`).
//! 4. For each protocol of [`RoutePolicy::protocols`]: stored config present
//!    and active, adapter registered at the active deployment, adapter route
//!    config equal to the stored one.
//!
//! Without a source gateway steps 3 and 4 are skipped. Without a policy the
//! on-chain default is still read but has nothing to be compared with, and
//! step 4 runs for every protocol that has a stored config for the route, so
//! adapter drift stays visible. Failed on-chain reads become
//! `ONCHAIN_QUERY_FAILED` items; store failures abort the audit.
//!
//! The audit is read-only and keeps no state between calls, so auditing an
//! unchanged route twice yields identical results.

use pgw_core::hex::hex_eq;
use pgw_core::{BridgeType, ChainRecord, ContractType, RoutePolicy};
use pgw_onchain::{AdapterGateway, CallContext, GatewayTarget};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::engine::Registries;
use crate::error::CrosschainError;
use crate::report::{
    route_key, CheckCode, ContractConfigCheckItem, CrosschainRouteStatus, RouteAuditOutcome,
    RouteRequest,
};
use crate::resolver::ChainResolver;
use crate::telemetry;

/// Everything an audit learned about a route, for the orchestrator to plan from.
#[derive(Debug, Clone)]
pub(crate) struct AuditedRoute {
    pub source: ChainRecord,
    pub dest: ChainRecord,
    pub policy: Option<RoutePolicy>,
    /// Source-chain gateway, when one is recorded.
    pub target: Option<GatewayTarget>,
    pub status: CrosschainRouteStatus,
}

#[derive(Clone)]
pub struct ConfigAuditEngine {
    pub(crate) registries: Registries,
    pub(crate) resolver: ChainResolver,
    pub(crate) gateway: Arc<dyn AdapterGateway>,
    pub(crate) config: EngineConfig,
}

impl ConfigAuditEngine {
    pub fn new(registries: Registries, gateway: Arc<dyn AdapterGateway>, config: EngineConfig) -> Self {
        Self {
            resolver: ChainResolver::new(registries.chains.clone()),
            registries,
            gateway,
            config,
        }
    }

    /// A fresh deadline for one operation.
    pub(crate) fn context(&self) -> CallContext {
        CallContext::with_timeout(self.config.rpc_timeout)
    }

    /// Audit the route `source -> dest`.
    ///
    /// # Errors
    ///
    /// Chain resolution failures and store failures. Discrepancies and
    /// failed on-chain reads are reported as items, not errors.
    pub fn audit(&self, source: &str, dest: &str) -> Result<CrosschainRouteStatus, CrosschainError> {
        let ctx = self.context();
        Ok(self.audit_route(&ctx, source, dest)?.status)
    }

    /// Audit each route in caller order. A failing route is recorded with
    /// its message and does not stop the rest.
    pub fn audit_bulk(&self, routes: &[RouteRequest]) -> Vec<RouteAuditOutcome> {
        routes
            .iter()
            .map(|req| match self.audit(&req.source, &req.dest) {
                Ok(status) => RouteAuditOutcome {
                    route_key: status.route_key.clone(),
                    status: Some(status),
                    error: None,
                },
                Err(err) => {
                    tracing::warn!(route = %req.key(), error = %err, "route audit failed");
                    telemetry::record_bulk_failure();
                    RouteAuditOutcome {
                        route_key: req.key(),
                        status: None,
                        error: Some(err.to_string()),
                    }
                }
            })
            .collect()
    }

    /// Audit every stored policy, in route-key order.
    ///
    /// # Errors
    ///
    /// Only a failure to list policies; per-route failures are outcomes.
    pub fn audit_all(&self) -> Result<Vec<RouteAuditOutcome>, CrosschainError> {
        Ok(self.audit_bulk(&self.declared_routes()?))
    }

    /// Every route with a stored policy, named by internal id and sorted by
    /// route key. A policy whose chain record is gone sorts by its raw ids.
    pub fn declared_routes(&self) -> Result<Vec<RouteRequest>, CrosschainError> {
        let chains = &self.registries.chains;
        let mut keyed = Vec::new();
        for policy in self.registries.policies.list()? {
            let request = RouteRequest::new(
                policy.route.source.as_uuid().to_string(),
                policy.route.dest.as_uuid().to_string(),
            );
            let key = match (
                chains.get_by_id(&policy.route.source)?,
                chains.get_by_id(&policy.route.dest)?,
            ) {
                (Some(source), Some(dest)) => route_key(&source, &dest),
                _ => request.key(),
            };
            keyed.push((key, request));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(keyed.into_iter().map(|(_, request)| request).collect())
    }

    pub(crate) fn audit_route(
        &self,
        ctx: &CallContext,
        source: &str,
        dest: &str,
    ) -> Result<AuditedRoute, CrosschainError> {
        let source = self.resolver.resolve(source)?;
        let dest = self.resolver.resolve(dest)?;
        let route = pgw_core::RoutePair::new(source.id, dest.id);
        let mut items = Vec::new();

        let policy = self.registries.policies.get_by_route(&route)?;
        if policy.is_none() {
            items.push(ContractConfigCheckItem::new(
                CheckCode::PolicyMissing,
                format!("no route policy for {} -> {}", source.caip2, dest.caip2),
            ));
        }

        let source_gateway = self
            .registries
            .contracts
            .active_contract(&source.id, ContractType::Gateway)?;
        let dest_gateway = self
            .registries
            .contracts
            .active_contract(&dest.id, ContractType::Gateway)?;
        for (leg, record) in [(&source, &source_gateway), (&dest, &dest_gateway)] {
            if record.is_none() {
                items.push(ContractConfigCheckItem::new(
                    CheckCode::ContractMissing,
                    format!("no active gateway contract on {}", leg.caip2),
                ));
            }
        }

        let target = source_gateway.map(|gw| GatewayTarget {
            chain: source.caip2.clone(),
            family: source.family,
            gateway_address: gw.address,
        });

        if let Some(target) = &target {
            let onchain = OnchainAudit {
                engine: self,
                ctx,
                source: &source,
                target,
                dest_key: dest.contract_key(),
                route,
            };
            match &policy {
                Some(policy) => {
                    onchain.check_default(policy, &mut items);
                    for bridge in policy.protocols() {
                        onchain.check_protocol(bridge, &mut items)?;
                    }
                }
                None => {
                    onchain.read_default(&mut items);
                    for stored in self.registries.bridge_configs.list_for_route(&route)? {
                        onchain.check_protocol(stored.bridge_type(), &mut items)?;
                    }
                }
            }
        }

        let status = CrosschainRouteStatus::from_items(&source, &dest, items);
        tracing::info!(
            route = %status.route_key,
            status = %status.status,
            items = status.items.len(),
            "route audited"
        );
        telemetry::record_audit(status.status);
        Ok(AuditedRoute {
            source,
            dest,
            policy,
            target,
            status,
        })
    }
}

/// On-chain half of one audit.
struct OnchainAudit<'a> {
    engine: &'a ConfigAuditEngine,
    ctx: &'a CallContext,
    source: &'a ChainRecord,
    target: &'a GatewayTarget,
    dest_key: String,
    route: pgw_core::RoutePair,
}

impl OnchainAudit<'_> {
    fn gateway(&self) -> &dyn AdapterGateway {
        self.engine.gateway.as_ref()
    }

    fn check_default(&self, policy: &RoutePolicy, items: &mut Vec<ContractConfigCheckItem>) {
        match self.gateway().default_bridge_type(self.ctx, self.target, &self.dest_key) {
            Ok(Some(bt)) if bt == policy.default_bridge_type => {}
            Ok(onchain) => {
                let found = onchain.map_or("unset", BridgeType::as_str);
                items.push(ContractConfigCheckItem::new(
                    CheckCode::DefaultBridgeMismatch,
                    format!(
                        "on-chain default bridge for {} is {found}, policy declares {}",
                        self.dest_key, policy.default_bridge_type
                    ),
                ));
            }
            Err(err) => items.push(ContractConfigCheckItem::new(
                CheckCode::OnchainQueryFailed,
                format!("reading default bridge type: {err}"),
            )),
        }
    }

    /// Default read for a route with no policy: only a failed read is reported.
    fn read_default(&self, items: &mut Vec<ContractConfigCheckItem>) {
        match self.gateway().default_bridge_type(self.ctx, self.target, &self.dest_key) {
            Ok(onchain) => tracing::debug!(
                dest = %self.dest_key,
                default = onchain.map_or("unset", BridgeType::as_str),
                "on-chain default without a policy"
            ),
            Err(err) => items.push(ContractConfigCheckItem::new(
                CheckCode::OnchainQueryFailed,
                format!("reading default bridge type: {err}"),
            )),
        }
    }

    fn check_protocol(
        &self,
        bridge: BridgeType,
        items: &mut Vec<ContractConfigCheckItem>,
    ) -> Result<(), CrosschainError> {
        let registries = &self.engine.registries;
        let stored = registries.bridge_configs.get_for_route(&self.route, bridge)?;
        match &stored {
            Some(cfg) if !cfg.is_active => {
                items.push(ContractConfigCheckItem::for_bridge(
                    CheckCode::BridgeConfigInactive,
                    bridge,
                    format!("{bridge} config for this route is inactive; on-chain comparison skipped"),
                ));
                return Ok(());
            }
            Some(_) => {}
            None => items.push(ContractConfigCheckItem::for_bridge(
                CheckCode::BridgeConfigMissing,
                bridge,
                format!("no stored {bridge} config for this route"),
            )),
        }

        let deployment = registries
            .contracts
            .active_contract(&self.source.id, bridge.adapter_contract_type())?;
        let missing_deployment = || {
            ContractConfigCheckItem::for_bridge(
                CheckCode::AdapterContractMissing,
                bridge,
                format!("no active {} contract on {}", bridge.adapter_contract_type(), self.source.caip2),
            )
        };

        let registered = match self
            .gateway()
            .registered_adapter(self.ctx, self.target, &self.dest_key, bridge)
        {
            Ok(registered) => registered,
            Err(err) => {
                items.push(ContractConfigCheckItem::for_bridge(
                    CheckCode::OnchainQueryFailed,
                    bridge,
                    format!("reading {bridge} adapter registration: {err}"),
                ));
                return Ok(());
            }
        };
        let adapter = match (registered, &deployment) {
            (None, _) => {
                items.push(ContractConfigCheckItem::for_bridge(
                    CheckCode::BridgeNotRegistered,
                    bridge,
                    format!("no {bridge} adapter registered on the gateway for {}", self.dest_key),
                ));
                if deployment.is_none() {
                    items.push(missing_deployment());
                }
                return Ok(());
            }
            (Some(registered), Some(record)) if !hex_eq(&registered, &record.address) => {
                items.push(ContractConfigCheckItem::for_bridge(
                    CheckCode::BridgeNotRegistered,
                    bridge,
                    format!(
                        "gateway routes {bridge} to {registered}, active deployment is {}",
                        record.address
                    ),
                ));
                return Ok(());
            }
            (Some(registered), Some(_)) => registered,
            (Some(registered), None) => {
                items.push(missing_deployment());
                registered
            }
        };

        let Some(stored) = stored else {
            return Ok(());
        };
        match self
            .gateway()
            .route_config(self.ctx, self.target, &adapter, &self.dest_key, bridge)
        {
            Ok(None) => items.push(ContractConfigCheckItem::for_bridge(
                CheckCode::BridgeConfigMismatch,
                bridge,
                format!("{bridge} adapter {adapter} has no route config for {}", self.dest_key),
            )),
            Ok(Some(onchain)) => {
                let fields = stored.config.diff(&onchain);
                if !fields.is_empty() {
                    items.push(ContractConfigCheckItem::for_bridge(
                        CheckCode::BridgeConfigMismatch,
                        bridge,
                        format!("{bridge} route config differs on: {}", fields.join(", ")),
                    ));
                }
            }
            Err(err) => items.push(ContractConfigCheckItem::for_bridge(
                CheckCode::OnchainQueryFailed,
                bridge,
                format!("reading {bridge} route config: {err}"),
            )),
        }
        Ok(())
    }
}
