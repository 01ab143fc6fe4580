//! # Bridge Config Store
//!
//! Per-protocol route configuration, unique by (route, bridge type).

use dashmap::DashMap;
use pgw_core::{BridgeConfig, BridgeConfigId, BridgeType, RoutePair};

use crate::error::{Outage, StoreError};

/// Persistence of per-protocol bridge configs.
pub trait BridgeConfigStore: Send + Sync {
    fn get(&self, id: &BridgeConfigId) -> Result<Option<BridgeConfig>, StoreError>;

    fn get_for_route(
        &self,
        route: &RoutePair,
        bridge: BridgeType,
    ) -> Result<Option<BridgeConfig>, StoreError>;

    /// Every protocol's config for one route, ordered by bridge type.
    fn list_for_route(&self, route: &RoutePair) -> Result<Vec<BridgeConfig>, StoreError>;

    /// All configs, ordered by (route, bridge type).
    fn list(&self) -> Result<Vec<BridgeConfig>, StoreError>;

    /// Insert or replace the config for (route, protocol). An existing
    /// config keeps its id.
    fn upsert(&self, config: BridgeConfig) -> Result<BridgeConfig, StoreError>;

    fn delete(&self, id: &BridgeConfigId) -> Result<BridgeConfig, StoreError>;
}

type Key = (RoutePair, BridgeType);

/// `DashMap`-backed bridge config store.
#[derive(Debug, Default)]
pub struct InMemoryBridgeConfigStore {
    configs: DashMap<Key, BridgeConfig>,
    outage: Outage,
}

impl InMemoryBridgeConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a backend outage (`Some(message)`) or clear it (`None`).
    pub fn set_outage(&self, message: Option<String>) {
        self.outage.set(message);
    }

    fn sorted(&self, filter: impl Fn(&Key) -> bool) -> Vec<BridgeConfig> {
        let mut out: Vec<(Key, BridgeConfig)> = self
            .configs
            .iter()
            .filter(|e| filter(e.key()))
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out.into_iter().map(|(_, c)| c).collect()
    }
}

impl BridgeConfigStore for InMemoryBridgeConfigStore {
    fn get(&self, id: &BridgeConfigId) -> Result<Option<BridgeConfig>, StoreError> {
        self.outage.check()?;
        Ok(self
            .configs
            .iter()
            .find(|e| &e.value().id == id)
            .map(|e| e.value().clone()))
    }

    fn get_for_route(
        &self,
        route: &RoutePair,
        bridge: BridgeType,
    ) -> Result<Option<BridgeConfig>, StoreError> {
        self.outage.check()?;
        Ok(self.configs.get(&(*route, bridge)).map(|e| e.value().clone()))
    }

    fn list_for_route(&self, route: &RoutePair) -> Result<Vec<BridgeConfig>, StoreError> {
        self.outage.check()?;
        Ok(self.sorted(|(r, _)| r == route))
    }

    fn list(&self) -> Result<Vec<BridgeConfig>, StoreError> {
        self.outage.check()?;
        Ok(self.sorted(|_| true))
    }

    fn upsert(&self, mut config: BridgeConfig) -> Result<BridgeConfig, StoreError> {
        self.outage.check()?;
        let key = (config.route, config.bridge_type());
        let mut entry = self.configs.entry(key).or_insert_with(|| config.clone());
        config.id = entry.id;
        *entry = config.clone();
        tracing::debug!(
            route = %config.route,
            bridge = %config.bridge_type(),
            id = %config.id,
            "bridge config stored"
        );
        Ok(config)
    }

    fn delete(&self, id: &BridgeConfigId) -> Result<BridgeConfig, StoreError> {
        self.outage.check()?;
        let not_found = || StoreError::NotFound {
            entity: "bridge config",
            key: id.to_string(),
        };
        let key = self
            .configs
            .iter()
            .find(|e| &e.value().id == id)
            .map(|e| *e.key())
            .ok_or_else(not_found)?;
        self.configs.remove(&key).map(|(_, c)| c).ok_or_else(not_found)
    }
}
