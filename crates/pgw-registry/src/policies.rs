//! # Route Policy Store
//!
//! Exactly one policy per ordered chain pair. `upsert` is idempotent by route
//! key: writing a policy for a pair that already has one replaces its
//! contents and keeps the stored id.

use dashmap::DashMap;
use pgw_core::{PolicyId, RoutePair, RoutePolicy};

use crate::error::{Outage, StoreError};

/// Persistence of route policies.
pub trait RoutePolicyStore: Send + Sync {
    fn get(&self, id: &PolicyId) -> Result<Option<RoutePolicy>, StoreError>;

    fn get_by_route(&self, route: &RoutePair) -> Result<Option<RoutePolicy>, StoreError>;

    /// All policies, ordered by route key.
    fn list(&self) -> Result<Vec<RoutePolicy>, StoreError>;

    /// Insert or replace the policy for `policy.route`; returns what was stored.
    fn upsert(&self, policy: RoutePolicy) -> Result<RoutePolicy, StoreError>;

    /// Remove a policy, returning it.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no policy has this id.
    fn delete(&self, id: &PolicyId) -> Result<RoutePolicy, StoreError>;
}

/// `DashMap`-backed policy store keyed by route.
#[derive(Debug, Default)]
pub struct InMemoryRoutePolicyStore {
    policies: DashMap<RoutePair, RoutePolicy>,
    outage: Outage,
}

impl InMemoryRoutePolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a backend outage (`Some(message)`) or clear it (`None`).
    pub fn set_outage(&self, message: Option<String>) {
        self.outage.set(message);
    }
}

impl RoutePolicyStore for InMemoryRoutePolicyStore {
    fn get(&self, id: &PolicyId) -> Result<Option<RoutePolicy>, StoreError> {
        self.outage.check()?;
        Ok(self
            .policies
            .iter()
            .find(|e| &e.value().id == id)
            .map(|e| e.value().clone()))
    }

    fn get_by_route(&self, route: &RoutePair) -> Result<Option<RoutePolicy>, StoreError> {
        self.outage.check()?;
        Ok(self.policies.get(route).map(|e| e.value().clone()))
    }

    fn list(&self) -> Result<Vec<RoutePolicy>, StoreError> {
        self.outage.check()?;
        let mut all: Vec<RoutePolicy> = self.policies.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.route.cmp(&b.route));
        Ok(all)
    }

    fn upsert(&self, mut policy: RoutePolicy) -> Result<RoutePolicy, StoreError> {
        self.outage.check()?;
        let mut entry = self.policies.entry(policy.route).or_insert_with(|| policy.clone());
        policy.id = entry.id;
        *entry = policy.clone();
        tracing::debug!(route = %policy.route, id = %policy.id, "route policy stored");
        Ok(policy)
    }

    fn delete(&self, id: &PolicyId) -> Result<RoutePolicy, StoreError> {
        self.outage.check()?;
        let route = self
            .policies
            .iter()
            .find(|e| &e.value().id == id)
            .map(|e| *e.key())
            .ok_or_else(|| StoreError::NotFound {
                entity: "route policy",
                key: id.to_string(),
            })?;
        self.policies
            .remove(&route)
            .map(|(_, p)| p)
            .ok_or_else(|| StoreError::NotFound {
                entity: "route policy",
                key: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgw_core::{BridgeType, ChainRecordId, FallbackMode};

    fn policy(route: RoutePair, default: BridgeType) -> RoutePolicy {
        RoutePolicy {
            id: PolicyId::new(),
            route,
            default_bridge_type: default,
            fallback_mode: FallbackMode::Strict,
            fallback_order: vec![],
        }
    }

    #[test]
    fn upsert_keeps_existing_id() {
        let store = InMemoryRoutePolicyStore::new();
        let route = RoutePair::new(ChainRecordId::new(), ChainRecordId::new());
        let first = store.upsert(policy(route, BridgeType::Ccip)).unwrap();
        let second = store.upsert(policy(route, BridgeType::LayerZero)).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(
            store.get_by_route(&route).unwrap().unwrap().default_bridge_type,
            BridgeType::LayerZero
        );
    }

    #[test]
    fn get_by_id_and_delete() {
        let store = InMemoryRoutePolicyStore::new();
        let route = RoutePair::new(ChainRecordId::new(), ChainRecordId::new());
        let stored = store.upsert(policy(route, BridgeType::Ccip)).unwrap();
        assert_eq!(store.get(&stored.id).unwrap(), Some(stored.clone()));
        assert_eq!(store.delete(&stored.id).unwrap(), stored);
        assert!(store.get_by_route(&route).unwrap().is_none());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let store = InMemoryRoutePolicyStore::new();
        assert!(matches!(
            store.delete(&PolicyId::new()),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn list_is_route_ordered() {
        let store = InMemoryRoutePolicyStore::new();
        for _ in 0..5 {
            let route = RoutePair::new(ChainRecordId::new(), ChainRecordId::new());
            store.upsert(policy(route, BridgeType::Ccip)).unwrap();
        }
        let routes: Vec<_> = store.list().unwrap().into_iter().map(|p| p.route).collect();
        let mut sorted = routes.clone();
        sorted.sort();
        assert_eq!(routes, sorted);
    }
}
