//! # Auto-Fix Orchestrator
//!
//! Brings a route's on-chain state into agreement with its stored policy
//! and configs.
//!
//! ## Planning
//!
//! From a fresh audit:
//!
//! 1. `setDefaultBridgeType` when the on-chain default differs from the
//!    policy default.
//! 2. Then, for each protocol in policy order, at most one step:
//!    `registerAdapter` when the adapter is not registered (or registered at
//!    a stale address), otherwise the protocol's `set*Config` when its route
//!    config mismatches.
//!
//! Findings with no on-chain remedy (missing policy, gateway, or stored
//! config) produce no steps.
//!
//! ## Execution
//!
//! Steps run strictly in order under one deadline. A failed step is recorded
//! and the next one still runs. Stored state is re-read at execution time,
//! so a config removed since the audit is `SKIPPED` rather than written.

use pgw_core::{BridgeType, RoutePair};
use pgw_onchain::{apply_route_config, ops, CallContext, GatewayTarget, TxReceipt};

use crate::audit::{AuditedRoute, ConfigAuditEngine};
use crate::error::CrosschainError;
use crate::report::{AutoFixResult, AutoFixStep, CheckCode, RouteRequest, RouteStatus, StepStatus};
use crate::telemetry;

/// A corrective call chosen by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlannedStep {
    SetDefault(BridgeType),
    RegisterAdapter(BridgeType),
    SetConfig(BridgeType),
}

impl PlannedStep {
    fn name(self) -> &'static str {
        match self {
            Self::SetDefault(_) => ops::SET_DEFAULT_BRIDGE_TYPE,
            Self::RegisterAdapter(_) => ops::REGISTER_ADAPTER,
            Self::SetConfig(bt) => bt.config_step_name(),
        }
    }

    fn bridge(self) -> BridgeType {
        match self {
            Self::SetDefault(bt) | Self::RegisterAdapter(bt) | Self::SetConfig(bt) => bt,
        }
    }
}

/// How a step ended, short of an upstream error.
enum Executed {
    Submitted(TxReceipt),
    Skipped(String),
    Blocked(String),
}

fn plan(route: &AuditedRoute) -> Vec<PlannedStep> {
    let (Some(policy), Some(_)) = (&route.policy, &route.target) else {
        return Vec::new();
    };
    let status = &route.status;
    let mut steps = Vec::new();
    if status.has(CheckCode::DefaultBridgeMismatch) {
        steps.push(PlannedStep::SetDefault(policy.default_bridge_type));
    }
    for bt in policy.protocols() {
        if status.has_for(CheckCode::BridgeNotRegistered, bt) {
            steps.push(PlannedStep::RegisterAdapter(bt));
        } else if status.has_for(CheckCode::BridgeConfigMismatch, bt) {
            steps.push(PlannedStep::SetConfig(bt));
        }
    }
    steps
}

#[derive(Clone)]
pub struct AutoFixOrchestrator {
    audit: ConfigAuditEngine,
}

impl AutoFixOrchestrator {
    pub fn new(audit: ConfigAuditEngine) -> Self {
        Self { audit }
    }

    /// Audit the route, then plan and execute the corrective steps.
    ///
    /// # Errors
    ///
    /// Only when the audit itself fails (unresolvable chain, store outage).
    /// Step failures are recorded in the result.
    pub fn auto_fix(&self, source: &str, dest: &str) -> Result<AutoFixResult, CrosschainError> {
        let ctx = self.audit.context();
        let route = self.audit.audit_route(&ctx, source, dest)?;
        let planned = plan(&route);
        let steps: Vec<AutoFixStep> = planned
            .iter()
            .map(|step| self.run_step(&ctx, &route, *step))
            .collect();

        let summary = if steps.is_empty() {
            if route.status.status == RouteStatus::Ready {
                "already correct".to_string()
            } else {
                format!(
                    "no automatic fix available for {} findings",
                    route.status.items.len()
                )
            }
        } else {
            let succeeded = steps
                .iter()
                .filter(|s| s.status == StepStatus::Success)
                .count();
            format!("{succeeded} of {} steps succeeded", steps.len())
        };
        let result = AutoFixResult {
            route_key: route.status.route_key.clone(),
            status_before: Some(route.status.status),
            steps,
            summary,
        };
        tracing::info!(
            route = %result.route_key,
            steps = result.steps.len(),
            failed = result.failed_steps(),
            "autofix finished"
        );
        Ok(result)
    }

    /// Fix each route in caller order. A route that cannot be fixed at all
    /// yields a result with a single failed `autoFix` step.
    pub fn auto_fix_bulk(&self, routes: &[RouteRequest]) -> Vec<AutoFixResult> {
        let mut results = Vec::with_capacity(routes.len());
        for req in routes {
            let result = match self.auto_fix(&req.source, &req.dest) {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(route = %req.key(), error = %err, "autofix failed for route");
                    telemetry::record_bulk_failure();
                    AutoFixResult::failed(req.key(), err.to_string())
                }
            };
            results.push(result);
        }
        results
    }

    fn run_step(&self, ctx: &CallContext, route: &AuditedRoute, step: PlannedStep) -> AutoFixStep {
        let name = step.name();
        let (status, message, tx_hash) = match self.execute(ctx, route, step) {
            Ok(Executed::Submitted(receipt)) => (
                StepStatus::Success,
                format!("{name} submitted on {}", receipt.chain),
                Some(receipt.tx_hash),
            ),
            Ok(Executed::Skipped(reason)) => (StepStatus::Skipped, reason, None),
            Ok(Executed::Blocked(reason)) => (StepStatus::Failed, reason, None),
            Err(err) => (StepStatus::Failed, err.to_string(), None),
        };
        if status == StepStatus::Failed {
            tracing::warn!(route = %route.status.route_key, step = name, %message, "autofix step failed");
        } else {
            tracing::debug!(route = %route.status.route_key, step = name, status = status.as_str(), "autofix step done");
        }
        telemetry::record_step(name, status);
        AutoFixStep {
            name: name.to_string(),
            bridge_type: Some(step.bridge()),
            status,
            message,
            tx_hash,
        }
    }

    fn execute(
        &self,
        ctx: &CallContext,
        route: &AuditedRoute,
        step: PlannedStep,
    ) -> Result<Executed, CrosschainError> {
        let Some(target) = &route.target else {
            return Ok(Executed::Blocked("no gateway contract on the source chain".into()));
        };
        let gateway = self.audit.gateway.as_ref();
        let registries = &self.audit.registries;
        let dest = route.dest.contract_key();

        match step {
            PlannedStep::SetDefault(bt) => {
                Ok(Executed::Submitted(gateway.set_default_bridge_type(ctx, target, &dest, bt)?))
            }
            PlannedStep::RegisterAdapter(bt) => {
                let Some(adapter) = registries
                    .contracts
                    .active_contract(&route.source.id, bt.adapter_contract_type())?
                else {
                    return Ok(Executed::Blocked(format!(
                        "no active {} contract on {}",
                        bt.adapter_contract_type(),
                        route.source.caip2
                    )));
                };
                Ok(Executed::Submitted(gateway.register_adapter(
                    ctx,
                    target,
                    &dest,
                    bt,
                    &adapter.address,
                )?))
            }
            PlannedStep::SetConfig(bt) => self.write_config(ctx, route, target, &dest, bt),
        }
    }

    fn write_config(
        &self,
        ctx: &CallContext,
        route: &AuditedRoute,
        target: &GatewayTarget,
        dest: &str,
        bt: BridgeType,
    ) -> Result<Executed, CrosschainError> {
        let pair = RoutePair::new(route.source.id, route.dest.id);
        let stored = match self.audit.registries.bridge_configs.get_for_route(&pair, bt)? {
            Some(cfg) if cfg.is_active => cfg,
            Some(_) => return Ok(Executed::Skipped(format!("{bt} config is inactive"))),
            None => return Ok(Executed::Skipped(format!("no stored {bt} config"))),
        };
        let gateway = self.audit.gateway.as_ref();
        let Some(adapter) = gateway.registered_adapter(ctx, target, dest, bt)? else {
            return Ok(Executed::Blocked(format!("no {bt} adapter registered for {dest}")));
        };
        Ok(Executed::Submitted(apply_route_config(
            gateway,
            ctx,
            target,
            &adapter,
            dest,
            &stored.config,
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Fixture, DEST, LZ_ADAPTER};
    use pgw_core::{ContractType, ProtocolConfig, SmartContractRecord};
    use pgw_registry::{BridgeConfigStore, ContractRegistry};

    fn orchestrator(fx: &Fixture) -> AutoFixOrchestrator {
        AutoFixOrchestrator::new(fx.audit_engine())
    }

    #[test]
    fn ready_route_needs_no_steps() {
        let fx = Fixture::ready();
        let result = orchestrator(&fx).auto_fix("8453", "42161").unwrap();
        assert!(result.steps.is_empty());
        assert_eq!(result.summary, "already correct");
        assert!(fx.gateway.writes().is_empty());
    }

    #[test]
    fn unfixable_findings_produce_no_steps() {
        let fx = Fixture::new();
        let result = orchestrator(&fx).auto_fix("8453", "42161").unwrap();
        assert!(result.steps.is_empty());
        assert_eq!(result.status_before, Some(RouteStatus::Error));
        assert!(result.summary.starts_with("no automatic fix"));
    }

    #[test]
    fn default_is_fixed_first_then_protocols_in_policy_order() {
        let fx = Fixture::ready();
        fx.gateway.seed_default(&fx.base.caip2, DEST, Some(BridgeType::Ccip));
        let mut lz = Fixture::lz_config();
        lz.options = "0x0003".into();
        fx.gateway
            .seed_route_config(&fx.base.caip2, LZ_ADAPTER, DEST, ProtocolConfig::LayerZero(lz));

        let result = orchestrator(&fx).auto_fix("8453", "42161").unwrap();
        let names: Vec<&str> = result.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["setDefaultBridgeType", "setLayerZeroConfig"]);
        assert!(result.is_success());
        assert_eq!(fx.gateway.writes(), vec!["setDefaultBridgeType", "setLayerZeroConfig"]);
        assert!(fx.audit_engine().audit("8453", "42161").unwrap().items.is_empty());
    }

    #[test]
    fn missing_adapter_deployment_fails_registration() {
        let fx = Fixture::ready();
        fx.with_fallback(vec![BridgeType::Ccip]);
        let result = orchestrator(&fx).auto_fix("8453", "42161").unwrap();
        assert_eq!(result.steps.len(), 1);
        let step = &result.steps[0];
        assert_eq!(step.name, "registerAdapter");
        assert_eq!(step.status, StepStatus::Failed);
        assert!(step.message.contains("CCIP_ADAPTER"));
        assert!(fx.gateway.writes().is_empty());
    }

    #[test]
    fn failed_step_does_not_abort_the_rest() {
        let fx = Fixture::ready();
        fx.with_fallback(vec![BridgeType::Ccip]);
        fx.gateway.seed_default(&fx.base.caip2, DEST, None);
        fx.contracts
            .insert(SmartContractRecord::new(
                fx.base.id,
                ContractType::CcipAdapter,
                "0x00000000000000000000000000000000000000c1",
            ))
            .unwrap();
        fx.gateway
            .fail_operation(ops::SET_DEFAULT_BRIDGE_TYPE, "execution reverted");

        let result = orchestrator(&fx).auto_fix("8453", "42161").unwrap();
        let outcome: Vec<(&str, StepStatus)> = result
            .steps
            .iter()
            .map(|s| (s.name.as_str(), s.status))
            .collect();
        assert_eq!(
            outcome,
            vec![
                ("setDefaultBridgeType", StepStatus::Failed),
                ("registerAdapter", StepStatus::Success),
            ]
        );
        assert!(result.steps[0].message.contains("execution reverted"));
        assert!(result.steps[1].tx_hash.is_some());
        assert_eq!(result.summary, "1 of 2 steps succeeded");
    }

    #[test]
    fn config_removed_after_audit_is_skipped() {
        let fx = Fixture::ready();
        let mut lz = Fixture::lz_config();
        lz.dst_eid = 9;
        fx.gateway
            .seed_route_config(&fx.base.caip2, LZ_ADAPTER, DEST, ProtocolConfig::LayerZero(lz));
        let orchestrator = orchestrator(&fx);
        let ctx = orchestrator.audit.context();
        let route = orchestrator.audit.audit_route(&ctx, "8453", "42161").unwrap();
        let stored = fx
            .bridge_configs
            .get_for_route(&fx.route(), BridgeType::LayerZero)
            .unwrap()
            .unwrap();
        fx.bridge_configs.delete(&stored.id).unwrap();

        let step = orchestrator.run_step(&ctx, &route, PlannedStep::SetConfig(BridgeType::LayerZero));
        assert_eq!(step.status, StepStatus::Skipped);
        assert!(fx.gateway.writes().is_empty());
    }

    #[test]
    fn bulk_turns_route_failures_into_results() {
        let fx = Fixture::ready();
        let routes = vec![
            RouteRequest::new("8453", "42161"),
            RouteRequest::new("8453", "eip155:10"),
        ];
        let results = orchestrator(&fx).auto_fix_bulk(&routes);
        assert_eq!(results.len(), 2);
        assert!(results[0].steps.is_empty());
        assert_eq!(results[1].route_key, "8453->eip155:10");
        assert_eq!(results[1].steps.len(), 1);
        assert_eq!(results[1].steps[0].name, "autoFix");
        assert_eq!(results[1].steps[0].status, StepStatus::Failed);
    }
}
