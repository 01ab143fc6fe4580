//! # Crosschain Engine
//!
//! Wires the stores, the gateway, and the engine configuration into every
//! component and exposes them behind one cloneable handle.

use std::sync::Arc;

use pgw_onchain::AdapterGateway;
use pgw_registry::{BridgeConfigStore, ChainRegistry, ContractRegistry, RoutePolicyStore};

use crate::admin::ConfigAdmin;
use crate::audit::ConfigAuditEngine;
use crate::autofix::AutoFixOrchestrator;
use crate::config::EngineConfig;
use crate::preflight::PreflightEvaluator;
use crate::resolver::ChainResolver;
use crate::route_error::RouteErrorDecoder;
use crate::validator::BridgeConfigValidator;

/// The four persistence collaborators.
#[derive(Clone)]
pub struct Registries {
    pub chains: Arc<dyn ChainRegistry>,
    pub policies: Arc<dyn RoutePolicyStore>,
    pub bridge_configs: Arc<dyn BridgeConfigStore>,
    pub contracts: Arc<dyn ContractRegistry>,
}

/// Every engine component sharing one set of collaborators.
#[derive(Clone)]
pub struct CrosschainEngine {
    resolver: ChainResolver,
    validator: BridgeConfigValidator,
    audit: ConfigAuditEngine,
    preflight: PreflightEvaluator,
    autofix: AutoFixOrchestrator,
    decoder: RouteErrorDecoder,
    admin: ConfigAdmin,
}

impl CrosschainEngine {
    pub fn new(registries: Registries, gateway: Arc<dyn AdapterGateway>, config: EngineConfig) -> Self {
        let resolver = ChainResolver::new(registries.chains.clone());
        let validator = BridgeConfigValidator::new(resolver.clone());
        let audit = ConfigAuditEngine::new(registries.clone(), gateway.clone(), config);
        tracing::debug!(
            gateway = gateway.gateway_name(),
            rpc_timeout_ms = config.rpc_timeout.as_millis() as u64,
            "crosschain engine initialised"
        );
        Self {
            preflight: PreflightEvaluator::new(audit.clone()),
            autofix: AutoFixOrchestrator::new(audit.clone()),
            decoder: RouteErrorDecoder::new(registries.clone(), gateway, config),
            admin: ConfigAdmin::new(registries, validator.clone()),
            resolver,
            validator,
            audit,
        }
    }

    pub fn resolver(&self) -> &ChainResolver {
        &self.resolver
    }

    pub fn validator(&self) -> &BridgeConfigValidator {
        &self.validator
    }

    pub fn audit(&self) -> &ConfigAuditEngine {
        &self.audit
    }

    pub fn preflight(&self) -> &PreflightEvaluator {
        &self.preflight
    }

    pub fn autofix(&self) -> &AutoFixOrchestrator {
        &self.autofix
    }

    pub fn route_errors(&self) -> &RouteErrorDecoder {
        &self.decoder
    }

    pub fn admin(&self) -> &ConfigAdmin {
        &self.admin
    }
}
