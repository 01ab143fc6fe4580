//! Shared unit-test fixture: Base -> Arbitrum over LayerZero.

use std::sync::Arc;

use pgw_core::{
    BridgeConfig, BridgeType, Caip2, ChainFamily, ChainRecord, ContractType, FallbackMode,
    LayerZeroConfig, PolicyId, ProtocolConfig, RoutePair, RoutePolicy, SmartContractRecord,
};
use pgw_onchain::InMemoryAdapterGateway;
use pgw_registry::{
    BridgeConfigStore, ContractRegistry, InMemoryBridgeConfigStore, InMemoryChainRegistry,
    InMemoryContractRegistry, InMemoryRoutePolicyStore, RoutePolicyStore,
};

use crate::audit::ConfigAuditEngine;
use crate::config::EngineConfig;
use crate::engine::Registries;

pub const BASE_GATEWAY: &str = "0x00000000000000000000000000000000000000f1";
pub const ARB_GATEWAY: &str = "0x00000000000000000000000000000000000000f2";
pub const LZ_ADAPTER: &str = "0x00000000000000000000000000000000000000a1";
pub const DEST: &str = "eip155:42161";

pub struct Fixture {
    pub chains: Arc<InMemoryChainRegistry>,
    pub policies: Arc<InMemoryRoutePolicyStore>,
    pub bridge_configs: Arc<InMemoryBridgeConfigStore>,
    pub contracts: Arc<InMemoryContractRegistry>,
    pub gateway: Arc<InMemoryAdapterGateway>,
    pub base: ChainRecord,
    pub arb: ChainRecord,
}

impl Fixture {
    /// Two chains and their gateways; no policy, configs, or on-chain state.
    pub fn new() -> Self {
        Self::with_gateways(true)
    }

    fn with_gateways(dest_gateway: bool) -> Self {
        let chains = Arc::new(InMemoryChainRegistry::new());
        let base = chains
            .insert(ChainRecord::new("Base", ChainFamily::Evm, "8453", Caip2::parse("eip155:8453").unwrap()))
            .unwrap();
        let arb = chains
            .insert(ChainRecord::new("Arbitrum One", ChainFamily::Evm, "42161", Caip2::parse(DEST).unwrap()))
            .unwrap();
        let contracts = Arc::new(InMemoryContractRegistry::new());
        contracts
            .insert(SmartContractRecord::new(base.id, ContractType::Gateway, BASE_GATEWAY))
            .unwrap();
        if dest_gateway {
            contracts
                .insert(SmartContractRecord::new(arb.id, ContractType::Gateway, ARB_GATEWAY))
                .unwrap();
        }
        Self {
            chains,
            policies: Arc::new(InMemoryRoutePolicyStore::new()),
            bridge_configs: Arc::new(InMemoryBridgeConfigStore::new()),
            contracts,
            gateway: Arc::new(InMemoryAdapterGateway::new()),
            base,
            arb,
        }
    }

    /// LayerZero route whose stored and on-chain state agree.
    pub fn ready() -> Self {
        let fx = Self::new();
        fx.make_ready();
        fx
    }

    pub fn ready_without_dest_gateway() -> Self {
        let fx = Self::with_gateways(false);
        fx.make_ready();
        fx
    }

    fn make_ready(&self) {
        self.policies
            .upsert(RoutePolicy {
                id: PolicyId::new(),
                route: self.route(),
                default_bridge_type: BridgeType::LayerZero,
                fallback_mode: FallbackMode::Strict,
                fallback_order: vec![],
            })
            .unwrap();
        self.bridge_configs
            .upsert(BridgeConfig::new(self.route(), ProtocolConfig::LayerZero(Self::lz_config())))
            .unwrap();
        self.contracts
            .insert(SmartContractRecord::new(self.base.id, ContractType::LayerZeroAdapter, LZ_ADAPTER))
            .unwrap();
        self.gateway
            .seed_default(&self.base.caip2, DEST, Some(BridgeType::LayerZero));
        self.gateway
            .seed_adapter(&self.base.caip2, DEST, BridgeType::LayerZero, LZ_ADAPTER);
        self.gateway.seed_route_config(
            &self.base.caip2,
            LZ_ADAPTER,
            DEST,
            ProtocolConfig::LayerZero(Self::lz_config()),
        );
    }

    pub fn lz_config() -> LayerZeroConfig {
        LayerZeroConfig {
            dst_eid: 30110,
            peer: format!("0x{}{}", "0".repeat(24), "ab".repeat(20)),
            options: "0x".into(),
        }
    }

    pub fn route(&self) -> RoutePair {
        RoutePair::new(self.base.id, self.arb.id)
    }

    /// Replace the policy's fallback order.
    pub fn with_fallback(&self, order: Vec<BridgeType>) {
        let mut policy = self.policies.get_by_route(&self.route()).unwrap().unwrap();
        policy.fallback_order = order;
        self.policies.upsert(policy).unwrap();
    }

    pub fn registries(&self) -> Registries {
        Registries {
            chains: self.chains.clone(),
            policies: self.policies.clone(),
            bridge_configs: self.bridge_configs.clone(),
            contracts: self.contracts.clone(),
        }
    }

    pub fn audit_engine(&self) -> ConfigAuditEngine {
        ConfigAuditEngine::new(self.registries(), self.gateway.clone(), EngineConfig::default())
    }
}
