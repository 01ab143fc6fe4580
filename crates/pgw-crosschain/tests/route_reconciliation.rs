//! # Route Reconciliation Test
//!
//! Drives the full engine against in-memory stores and an in-memory gateway:
//! - Operator configuration through the admin surface
//! - Audit of a matching route, a mismatched default, and drifted configs
//! - Preflight verdicts
//! - Autofix (single and bulk) followed by re-audit
//! - Route error diagnosis

use std::sync::Arc;
use std::time::Duration;

use pgw_core::{BridgeType, Caip2, ChainFamily, ChainRecord, ContractType, PaymentId, ProtocolConfig, SmartContractRecord};
use pgw_crosschain::{
    BridgeConfigInput, CheckCode, CrosschainEngine, CrosschainError, EngineConfig, NumericInput,
    Registries, RouteRequest, RouteStatus, RoutePolicyInput, StepStatus,
};
use pgw_onchain::abi::{encode_call, Token};
use pgw_onchain::{ops, InMemoryAdapterGateway};
use pgw_registry::{
    ContractRegistry, InMemoryBridgeConfigStore, InMemoryChainRegistry, InMemoryContractRegistry,
    InMemoryRoutePolicyStore,
};

const BASE: &str = "eip155:8453";
const ARBITRUM: &str = "eip155:42161";
const OPTIMISM: &str = "eip155:10";
const LZ_ADAPTER: &str = "0x1111111111111111111111111111111111111111";
const CCIP_ADAPTER: &str = "0x2222222222222222222222222222222222222222";
const PEER: &str = "0x000000000000000000000000abababababababababababababababababababab";

struct Harness {
    engine: CrosschainEngine,
    chains: Arc<InMemoryChainRegistry>,
    contracts: Arc<InMemoryContractRegistry>,
    gateway: Arc<InMemoryAdapterGateway>,
}

impl Harness {
    fn new() -> Self {
        let chains = Arc::new(InMemoryChainRegistry::new());
        let contracts = Arc::new(InMemoryContractRegistry::new());
        for (i, (name, caip2)) in [("Base", BASE), ("Arbitrum One", ARBITRUM), ("Optimism", OPTIMISM)]
            .into_iter()
            .enumerate()
        {
            let caip2 = Caip2::parse(caip2).unwrap();
            let record = chains
                .insert(ChainRecord::new(name, ChainFamily::Evm, caip2.reference().to_string(), caip2))
                .unwrap();
            contracts
                .insert(SmartContractRecord::new(
                    record.id,
                    ContractType::Gateway,
                    format!("0x{:040x}", 0xf0 + i),
                ))
                .unwrap();
        }
        let gateway = Arc::new(InMemoryAdapterGateway::new());
        let registries = Registries {
            chains: chains.clone(),
            policies: Arc::new(InMemoryRoutePolicyStore::new()),
            bridge_configs: Arc::new(InMemoryBridgeConfigStore::new()),
            contracts: contracts.clone(),
        };
        let engine = CrosschainEngine::new(
            registries,
            gateway.clone(),
            EngineConfig::default().with_rpc_timeout(Duration::from_secs(2)),
        );
        Self {
            engine,
            chains,
            contracts,
            gateway,
        }
    }

    fn chain(&self, caip2: &str) -> ChainRecord {
        use pgw_registry::ChainRegistry;
        self.chains
            .get_by_caip2(&Caip2::parse(caip2).unwrap())
            .unwrap()
            .unwrap()
    }

    fn deploy_adapter(&self, chain: &str, kind: ContractType, address: &str) {
        let chain = self.chain(chain);
        self.contracts
            .insert(SmartContractRecord::new(chain.id, kind, address))
            .unwrap();
    }

    fn declare_layerzero_route(&self, source: &str, dest: &str) {
        let admin = self.engine.admin();
        admin
            .upsert_route_policy(&RoutePolicyInput {
                source_chain_id: source.into(),
                dest_chain_id: dest.into(),
                default_bridge_type: Some("LAYERZERO".into()),
                ..Default::default()
            })
            .unwrap();
        admin
            .upsert_bridge_config(
                BridgeType::LayerZero,
                &BridgeConfigInput {
                    source_chain_id: source.into(),
                    dest_chain_id: dest.into(),
                    dst_eid: Some(NumericInput::Number(30110)),
                    peer_hex: Some(PEER.into()),
                    ..Default::default()
                },
            )
            .unwrap();
        self.deploy_adapter(source, ContractType::LayerZeroAdapter, LZ_ADAPTER);
    }

    /// Mirror the stored LayerZero declaration on chain.
    fn mirror_onchain(&self, source: &str, dest: &str) {
        let chain = Caip2::parse(source).unwrap();
        self.gateway.seed_default(&chain, dest, Some(BridgeType::LayerZero));
        self.gateway
            .seed_adapter(&chain, dest, BridgeType::LayerZero, LZ_ADAPTER);
        self.gateway.seed_route_config(
            &chain,
            LZ_ADAPTER,
            dest,
            ProtocolConfig::LayerZero(pgw_core::LayerZeroConfig {
                dst_eid: 30110,
                peer: PEER.into(),
                options: "0x".into(),
            }),
        );
    }

    fn ready_route(&self, source: &str, dest: &str) {
        self.declare_layerzero_route(source, dest);
        self.mirror_onchain(source, dest);
    }
}

// ---------------------------------------------------------------------------
// 1. Audit
// ---------------------------------------------------------------------------

#[test]
fn matching_layerzero_route_is_ready() {
    let h = Harness::new();
    h.ready_route(BASE, ARBITRUM);
    let status = h.engine.audit().audit(BASE, ARBITRUM).unwrap();
    assert_eq!(status.status, RouteStatus::Ready);
    assert!(status.items.is_empty());
    assert_eq!(status.source.caip2.to_string(), BASE);
    assert_eq!(status.dest.chain_id, "42161");
}

#[test]
fn onchain_hyperbridge_default_is_degraded() {
    let h = Harness::new();
    h.ready_route(BASE, ARBITRUM);
    h.gateway
        .seed_default(&Caip2::parse(BASE).unwrap(), ARBITRUM, Some(BridgeType::Hyperbridge));
    let status = h.engine.audit().audit(BASE, ARBITRUM).unwrap();
    assert!(status.status >= RouteStatus::Degraded);
    assert!(status.has(CheckCode::DefaultBridgeMismatch));
    assert!(status.items[0].message.contains("HYPERBRIDGE"));
}

#[test]
fn unconfigured_gateway_reports_every_missing_piece() {
    let h = Harness::new();
    h.declare_layerzero_route(BASE, ARBITRUM);
    let status = h.engine.audit().audit("8453", "42161").unwrap();
    assert_eq!(status.status, RouteStatus::Error);
    let codes: Vec<CheckCode> = status.items.iter().map(|i| i.code).collect();
    assert_eq!(codes, vec![CheckCode::DefaultBridgeMismatch, CheckCode::BridgeNotRegistered]);
}

#[test]
fn adapter_drift_is_visible_after_policy_removal() {
    let h = Harness::new();
    h.ready_route(BASE, ARBITRUM);
    h.gateway.seed_route_config(
        &Caip2::parse(BASE).unwrap(),
        LZ_ADAPTER,
        ARBITRUM,
        ProtocolConfig::LayerZero(pgw_core::LayerZeroConfig {
            dst_eid: 1,
            peer: PEER.into(),
            options: "0x".into(),
        }),
    );
    h.engine.admin().delete_route_policy(BASE, ARBITRUM).unwrap();

    let status = h.engine.audit().audit(BASE, ARBITRUM).unwrap();

    assert_eq!(status.status, RouteStatus::Error);
    assert!(status.has(CheckCode::PolicyMissing));
    assert!(status.has_for(CheckCode::BridgeConfigMismatch, BridgeType::LayerZero));
    assert!(h.gateway.calls().iter().any(|c| c.operation == ops::ROUTE_CONFIG));
}

#[test]
fn auditing_twice_yields_identical_status() {
    let h = Harness::new();
    h.declare_layerzero_route(BASE, ARBITRUM);
    let audit = h.engine.audit();
    assert_eq!(audit.audit(BASE, ARBITRUM).unwrap(), audit.audit(BASE, ARBITRUM).unwrap());
}

#[test]
fn slow_endpoint_is_cut_off_by_the_deadline() {
    let h = Harness::new();
    h.ready_route(BASE, ARBITRUM);
    let chains: Arc<InMemoryChainRegistry> = h.chains.clone();
    let engine = CrosschainEngine::new(
        Registries {
            chains,
            policies: Arc::new(InMemoryRoutePolicyStore::new()),
            bridge_configs: Arc::new(InMemoryBridgeConfigStore::new()),
            contracts: h.contracts.clone(),
        },
        h.gateway.clone(),
        EngineConfig::default().with_rpc_timeout(Duration::from_millis(20)),
    );
    engine
        .admin()
        .upsert_route_policy(&RoutePolicyInput {
            source_chain_id: BASE.into(),
            dest_chain_id: ARBITRUM.into(),
            default_bridge_type: Some("LAYERZERO".into()),
            ..Default::default()
        })
        .unwrap();
    h.gateway.set_latency(Duration::from_millis(50));
    let status = engine.audit().audit(BASE, ARBITRUM).unwrap();
    assert!(status.has(CheckCode::OnchainQueryFailed));
    assert!(status
        .items
        .iter()
        .filter(|i| i.code == CheckCode::OnchainQueryFailed)
        .all(|i| i.message.contains("deadline")));
}

// ---------------------------------------------------------------------------
// 2. Preflight
// ---------------------------------------------------------------------------

#[test]
fn preflight_blocks_exactly_on_error() {
    let h = Harness::new();
    h.ready_route(BASE, ARBITRUM);
    h.declare_layerzero_route(BASE, OPTIMISM);

    let ready = h.engine.preflight().preflight(BASE, ARBITRUM);
    assert!(ready.executable);

    h.gateway
        .seed_default(&Caip2::parse(BASE).unwrap(), ARBITRUM, Some(BridgeType::Ccip));
    let degraded = h.engine.preflight().preflight(BASE, ARBITRUM);
    assert!(degraded.executable);
    assert_eq!(degraded.reasons.len(), 1);

    let broken = h.engine.preflight().preflight(BASE, OPTIMISM);
    assert!(!broken.executable);
    assert_eq!(broken.status, Some(RouteStatus::Error));

    for (src, dst) in [(BASE, ARBITRUM), (BASE, OPTIMISM), (ARBITRUM, BASE)] {
        let audit = h.engine.audit().audit(src, dst).unwrap();
        let preflight = h.engine.preflight().preflight(src, dst);
        assert_eq!(preflight.executable, audit.status != RouteStatus::Error);
    }
}

// ---------------------------------------------------------------------------
// 3. Autofix
// ---------------------------------------------------------------------------

#[test]
fn autofix_default_mismatch_then_ready() {
    let h = Harness::new();
    h.ready_route(BASE, ARBITRUM);
    h.gateway
        .seed_default(&Caip2::parse(BASE).unwrap(), ARBITRUM, Some(BridgeType::Hyperbridge));

    let result = h.engine.autofix().auto_fix(BASE, ARBITRUM).unwrap();
    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].name, "setDefaultBridgeType");
    assert_eq!(result.steps[0].status, StepStatus::Success);
    assert_eq!(result.status_before, Some(RouteStatus::Degraded));

    let after = h.engine.audit().audit(BASE, ARBITRUM).unwrap();
    assert_eq!(after.status, RouteStatus::Ready);
}

#[test]
fn autofix_builds_unconfigured_route_in_two_passes() {
    let h = Harness::new();
    h.declare_layerzero_route(BASE, ARBITRUM);

    let first = h.engine.autofix().auto_fix(BASE, ARBITRUM).unwrap();
    let names: Vec<&str> = first.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["setDefaultBridgeType", "registerAdapter"]);
    assert!(first.is_success());

    let second = h.engine.autofix().auto_fix(BASE, ARBITRUM).unwrap();
    let names: Vec<&str> = second.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["setLayerZeroConfig"]);

    let third = h.engine.autofix().auto_fix(BASE, ARBITRUM).unwrap();
    assert!(third.steps.is_empty());
    assert_eq!(third.summary, "already correct");
}

#[test]
fn autofix_continues_past_failed_steps() {
    let h = Harness::new();
    h.declare_layerzero_route(BASE, ARBITRUM);
    h.gateway
        .fail_operation(ops::SET_DEFAULT_BRIDGE_TYPE, "caller is not the owner");

    let result = h.engine.autofix().auto_fix(BASE, ARBITRUM).unwrap();
    assert_eq!(result.steps.len(), 2);
    assert_eq!(result.steps[0].status, StepStatus::Failed);
    assert!(result.steps[0].message.contains("caller is not the owner"));
    assert_eq!(result.steps[1].status, StepStatus::Success);
    assert_eq!(result.failed_steps(), 1);
}

#[test]
fn autofix_bulk_isolates_an_unresolvable_route() {
    let h = Harness::new();
    for dest in [ARBITRUM, OPTIMISM] {
        h.ready_route(BASE, dest);
        h.gateway
            .seed_default(&Caip2::parse(BASE).unwrap(), dest, Some(BridgeType::Ccip));
    }
    let routes = vec![
        RouteRequest::new(BASE, ARBITRUM),
        RouteRequest::new(BASE, "eip155:999999"),
        RouteRequest::new(BASE, OPTIMISM),
    ];

    let results = h.engine.autofix().auto_fix_bulk(&routes);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_success() && results[0].steps.len() == 1);
    assert_eq!(results[1].steps.len(), 1);
    assert_eq!(results[1].steps[0].name, "autoFix");
    assert_eq!(results[1].steps[0].status, StepStatus::Failed);
    assert!(results[1].steps[0].message.contains("eip155:999999"));
    assert!(results[2].is_success() && results[2].steps.len() == 1);

    for dest in [ARBITRUM, OPTIMISM] {
        assert_eq!(h.engine.audit().audit(BASE, dest).unwrap().status, RouteStatus::Ready);
    }
}

#[test]
fn stale_adapter_is_reregistered() {
    let h = Harness::new();
    h.ready_route(BASE, ARBITRUM);
    h.deploy_adapter(BASE, ContractType::LayerZeroAdapter, CCIP_ADAPTER);

    let status = h.engine.audit().audit(BASE, ARBITRUM).unwrap();
    assert!(status.has_for(CheckCode::BridgeNotRegistered, BridgeType::LayerZero));

    let result = h.engine.autofix().auto_fix(BASE, ARBITRUM).unwrap();
    assert_eq!(result.steps[0].name, "registerAdapter");
    assert_eq!(result.steps[0].status, StepStatus::Success);
    // The new adapter has no route config yet.
    let after = h.engine.audit().audit(BASE, ARBITRUM).unwrap();
    assert!(after.has_for(CheckCode::BridgeConfigMismatch, BridgeType::LayerZero));
}

// ---------------------------------------------------------------------------
// 4. Bulk recheck
// ---------------------------------------------------------------------------

#[test]
fn audit_all_follows_stored_policies() {
    let h = Harness::new();
    h.ready_route(BASE, ARBITRUM);
    h.declare_layerzero_route(BASE, OPTIMISM);
    let outcomes = h.engine.audit().audit_all().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.error.is_none()));
    let keys: Vec<&str> = outcomes.iter().map(|o| o.route_key.as_str()).collect();
    assert_eq!(keys, vec!["eip155:8453->eip155:10", "eip155:8453->eip155:42161"]);
    let statuses: Vec<RouteStatus> = outcomes.iter().map(|o| o.status.as_ref().unwrap().status).collect();
    assert_eq!(statuses, vec![RouteStatus::Error, RouteStatus::Ready]);
}

// ---------------------------------------------------------------------------
// 5. Validation through the admin surface
// ---------------------------------------------------------------------------

#[test]
fn same_chain_in_two_forms_is_rejected() {
    let h = Harness::new();
    let err = h
        .engine
        .admin()
        .upsert_route_policy(&RoutePolicyInput {
            source_chain_id: BASE.into(),
            dest_chain_id: "8453".into(),
            default_bridge_type: Some("CCIP".into()),
            ..Default::default()
        })
        .unwrap_err();
    match err {
        CrosschainError::Validation(v) => assert!(v.mentions("destChainId")),
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn resolver_forms_agree_through_the_engine() {
    let h = Harness::new();
    let base = h.chain(BASE);
    let resolver = h.engine.resolver();
    for form in [base.id.as_uuid().to_string(), BASE.to_string(), "8453".to_string()] {
        assert_eq!(resolver.resolve(&form).unwrap(), base);
    }
}

// ---------------------------------------------------------------------------
// 6. Route error diagnosis
// ---------------------------------------------------------------------------

#[test]
fn decodes_nested_bridge_failure() {
    let h = Harness::new();
    let payment = format!("0x{}", "ab".repeat(32));
    let inner = encode_call("Error(string)", &[Token::String("peer not set".into())]);
    let data = encode_call(
        "BridgeSendFailed(uint8,bytes)",
        &[Token::Uint(3), Token::Bytes(inner)],
    );
    h.gateway
        .seed_route_error(&Caip2::parse(BASE).unwrap(), PaymentId::from_hex(&payment).unwrap(), data);

    let diag = h.engine.route_errors().decode("8453", &payment).unwrap();
    assert!(diag.found);
    assert!(diag.decoded.contains("LAYERZERO"));
    assert!(diag.decoded.contains("peer not set"));
    assert_eq!(diag.gateway_address, format!("0x{:040x}", 0xf0));
}
