//! # Deployment Manifest
//!
//! A YAML file describing one deployment: chains, deployed contracts, route
//! policies, bridge configs, and how to reach the chains. Loading a manifest
//! builds a [`CrosschainEngine`] over in-memory stores, pushing every policy
//! and config through the same validation the admin surface applies.
//!
//! ```yaml
//! rpc_timeout_ms: 5000
//! chains:
//!   - { name: Base, family: evm, chain_id: "8453", caip2: "eip155:8453" }
//! contracts:
//!   - { chain: "eip155:8453", type: GATEWAY, address: "0x..." }
//! policies:
//!   - { sourceChainId: "eip155:8453", destChainId: "eip155:42161", defaultBridgeType: LAYERZERO }
//! bridge_configs:
//!   - { protocol: LAYERZERO, sourceChainId: "8453", destChainId: "42161", dstEid: 30110, peerHex: "0x..." }
//! # Either live endpoints (feature `evm-rpc`) ...
//! rpc:
//!   - { chain: "eip155:8453", url: "https://...", from: "0x..." }
//! # ... or an on-chain snapshot for dry runs.
//! onchain:
//!   - chain: "eip155:8453"
//!     defaults: { "eip155:42161": LAYERZERO }
//!     adapters: [{ dest: "eip155:42161", bridge: LAYERZERO, address: "0x..." }]
//! ```
//!
//! Policy and bridge config entries use the same camelCase field names as
//! the admin payloads.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use pgw_core::hex::{decode_hex, left_pad_hex};
use pgw_core::{BridgeType, Caip2, ChainFamily, ChainRecord, ContractType, PaymentId, ProtocolConfig, SmartContractRecord};
use pgw_crosschain::{
    BridgeConfigInput, ChainResolver, CrosschainEngine, EngineConfig, Registries, RoutePolicyInput,
};
use pgw_onchain::{AdapterGateway, InMemoryAdapterGateway};
use pgw_registry::{
    ContractRegistry, InMemoryBridgeConfigStore, InMemoryChainRegistry, InMemoryContractRegistry,
    InMemoryRoutePolicyStore,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Overrides `PGW_RPC_TIMEOUT_MS`.
    #[serde(default)]
    pub rpc_timeout_ms: Option<u64>,
    #[serde(default)]
    pub chains: Vec<ChainEntry>,
    #[serde(default)]
    pub contracts: Vec<ContractEntry>,
    #[serde(default)]
    pub policies: Vec<RoutePolicyInput>,
    #[serde(default)]
    pub bridge_configs: Vec<BridgeConfigEntry>,
    #[serde(default)]
    pub rpc: Vec<RpcEntry>,
    #[serde(default)]
    pub onchain: Vec<OnchainSnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainEntry {
    pub name: String,
    pub family: ChainFamily,
    pub chain_id: String,
    pub caip2: Caip2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractEntry {
    /// Chain in any identifier form.
    pub chain: String,
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfigEntry {
    pub protocol: BridgeType,
    #[serde(flatten)]
    pub input: BridgeConfigInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpcEntry {
    pub chain: Caip2,
    pub url: String,
    /// Sender address the endpoint signs for.
    pub from: String,
}

/// On-chain state of one source chain's gateway and adapters.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnchainSnapshot {
    pub chain: Caip2,
    /// Default bridge per destination; `null` is the unset value.
    #[serde(default)]
    pub defaults: BTreeMap<String, Option<BridgeType>>,
    #[serde(default)]
    pub adapters: Vec<AdapterEntry>,
    #[serde(default)]
    pub route_configs: Vec<RouteConfigEntry>,
    #[serde(default)]
    pub route_errors: Vec<RouteErrorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterEntry {
    pub dest: String,
    pub bridge: BridgeType,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfigEntry {
    pub adapter: String,
    pub dest: String,
    pub config: ProtocolConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteErrorEntry {
    pub payment_id: PaymentId,
    /// Raw revert data as hex.
    pub data: String,
}

/// What a manifest loaded into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSummary {
    pub chains: usize,
    pub contracts: usize,
    pub policies: usize,
    pub bridge_configs: usize,
    pub gateway: String,
    pub rpc_timeout_ms: u64,
}

pub struct Deployment {
    pub engine: CrosschainEngine,
    pub summary: ManifestSummary,
}

impl Manifest {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("failed to parse manifest")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid manifest: {}", path.display()))
    }

    /// `base` with this manifest's overrides applied.
    pub fn engine_config(&self, base: EngineConfig) -> Result<EngineConfig> {
        match self.rpc_timeout_ms {
            None => Ok(base),
            Some(0) => bail!("rpc_timeout_ms must be greater than zero"),
            Some(ms) => Ok(base.with_rpc_timeout(Duration::from_millis(ms))),
        }
    }

    /// Build the engine, validating every entry.
    pub fn deploy(&self, config: EngineConfig) -> Result<Deployment> {
        let chains = Arc::new(InMemoryChainRegistry::new());
        for entry in &self.chains {
            let record = ChainRecord::new(
                entry.name.clone(),
                entry.family,
                entry.chain_id.clone(),
                entry.caip2.clone(),
            );
            chains
                .insert(record)
                .with_context(|| format!("chain {}", entry.caip2))?;
        }

        let resolver = ChainResolver::new(chains.clone());
        let contracts = Arc::new(InMemoryContractRegistry::new());
        for (i, entry) in self.contracts.iter().enumerate() {
            let chain = resolver
                .resolve(&entry.chain)
                .with_context(|| format!("contracts[{i}]"))?;
            let address = left_pad_hex(&entry.address, chain.family.address_len())
                .with_context(|| format!("contracts[{i}].address"))?;
            contracts
                .insert(SmartContractRecord::new(chain.id, entry.contract_type, address))
                .with_context(|| format!("contracts[{i}]"))?;
        }

        let gateway = self.gateway()?;
        let summary = ManifestSummary {
            chains: self.chains.len(),
            contracts: self.contracts.len(),
            policies: self.policies.len(),
            bridge_configs: self.bridge_configs.len(),
            gateway: gateway.gateway_name().to_string(),
            rpc_timeout_ms: config.rpc_timeout.as_millis() as u64,
        };
        let registries = Registries {
            chains,
            policies: Arc::new(InMemoryRoutePolicyStore::new()),
            bridge_configs: Arc::new(InMemoryBridgeConfigStore::new()),
            contracts,
        };
        let engine = CrosschainEngine::new(registries, gateway, config);

        for (i, policy) in self.policies.iter().enumerate() {
            engine
                .admin()
                .upsert_route_policy(policy)
                .with_context(|| format!("policies[{i}]"))?;
        }
        for (i, entry) in self.bridge_configs.iter().enumerate() {
            engine
                .admin()
                .upsert_bridge_config(entry.protocol, &entry.input)
                .with_context(|| format!("bridge_configs[{i}] ({})", entry.protocol))?;
        }
        tracing::debug!(?summary, "manifest deployed");
        Ok(Deployment { engine, summary })
    }

    fn gateway(&self) -> Result<Arc<dyn AdapterGateway>> {
        if !self.rpc.is_empty() {
            if !self.onchain.is_empty() {
                tracing::warn!("manifest lists rpc endpoints; the onchain snapshot is ignored");
            }
            return self.rpc_gateway();
        }
        let gateway = InMemoryAdapterGateway::new();
        for snapshot in &self.onchain {
            let chain = &snapshot.chain;
            for (dest, bridge) in &snapshot.defaults {
                gateway.seed_default(chain, dest, *bridge);
            }
            for adapter in &snapshot.adapters {
                gateway.seed_adapter(chain, &adapter.dest, adapter.bridge, &adapter.address);
            }
            for entry in &snapshot.route_configs {
                gateway.seed_route_config(chain, &entry.adapter, &entry.dest, entry.config.clone());
            }
            for entry in &snapshot.route_errors {
                let data = decode_hex(&entry.data)
                    .with_context(|| format!("route error for payment {}", entry.payment_id))?;
                gateway.seed_route_error(chain, entry.payment_id, data);
            }
        }
        Ok(Arc::new(gateway))
    }

    #[cfg(feature = "evm-rpc")]
    fn rpc_gateway(&self) -> Result<Arc<dyn AdapterGateway>> {
        let endpoints = self
            .rpc
            .iter()
            .map(|e| pgw_onchain::EvmEndpoint {
                chain: e.chain.clone(),
                rpc_url: e.url.clone(),
                from_address: e.from.clone(),
            })
            .collect();
        let gateway = pgw_onchain::EvmAdapterGateway::new(endpoints).context("rpc endpoints")?;
        Ok(Arc::new(gateway))
    }

    #[cfg(not(feature = "evm-rpc"))]
    fn rpc_gateway(&self) -> Result<Arc<dyn AdapterGateway>> {
        bail!("manifest lists rpc endpoints but pgw was built without the `evm-rpc` feature")
    }
}

/// Load `path` and deploy it with environment defaults.
pub fn open(path: &Path) -> Result<Deployment> {
    let manifest = Manifest::load(path)?;
    let config = manifest.engine_config(EngineConfig::from_env()?)?;
    manifest.deploy(config)
}
