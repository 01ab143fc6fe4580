//! # Chain Registry
//!
//! Lookup of chain records by each of the three identifier forms.

use dashmap::DashMap;
use pgw_core::{Caip2, ChainRecord, ChainRecordId};

use crate::error::{Outage, StoreError};

/// Read access to registered chains.
///
/// Implementations must be `Send + Sync` so one registry can be shared
/// behind an `Arc` by every engine component.
pub trait ChainRegistry: Send + Sync {
    fn get_by_id(&self, id: &ChainRecordId) -> Result<Option<ChainRecord>, StoreError>;

    /// Lookup by legacy chain id (exact string match).
    fn get_by_chain_id(&self, chain_id: &str) -> Result<Option<ChainRecord>, StoreError>;

    fn get_by_caip2(&self, caip2: &Caip2) -> Result<Option<ChainRecord>, StoreError>;

    /// All chains, ordered by CAIP-2 identifier.
    fn list(&self) -> Result<Vec<ChainRecord>, StoreError>;
}

/// `DashMap`-backed chain registry.
#[derive(Debug, Default)]
pub struct InMemoryChainRegistry {
    chains: DashMap<ChainRecordId, ChainRecord>,
    outage: Outage,
}

impl InMemoryChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chain.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] if the internal id, legacy chain id, or CAIP-2
    /// identifier is already registered to another record.
    pub fn insert(&self, record: ChainRecord) -> Result<ChainRecord, StoreError> {
        self.outage.check()?;
        for existing in self.chains.iter() {
            let other = existing.value();
            let clash = if other.id == record.id {
                Some("internal id")
            } else if other.chain_id == record.chain_id {
                Some("chain id")
            } else if other.caip2 == record.caip2 {
                Some("CAIP-2 identifier")
            } else {
                None
            };
            if let Some(field) = clash {
                return Err(StoreError::Conflict {
                    entity: "chain",
                    reason: format!("{field} of {} already registered", record.caip2),
                });
            }
        }
        tracing::debug!(chain = %record.caip2, id = %record.id, "chain registered");
        self.chains.insert(record.id, record.clone());
        Ok(record)
    }

    /// Simulate a backend outage (`Some(message)`) or clear it (`None`).
    pub fn set_outage(&self, message: Option<String>) {
        self.outage.set(message);
    }
}

impl ChainRegistry for InMemoryChainRegistry {
    fn get_by_id(&self, id: &ChainRecordId) -> Result<Option<ChainRecord>, StoreError> {
        self.outage.check()?;
        Ok(self.chains.get(id).map(|e| e.value().clone()))
    }

    fn get_by_chain_id(&self, chain_id: &str) -> Result<Option<ChainRecord>, StoreError> {
        self.outage.check()?;
        Ok(self
            .chains
            .iter()
            .find(|e| e.value().chain_id == chain_id)
            .map(|e| e.value().clone()))
    }

    fn get_by_caip2(&self, caip2: &Caip2) -> Result<Option<ChainRecord>, StoreError> {
        self.outage.check()?;
        Ok(self
            .chains
            .iter()
            .find(|e| &e.value().caip2 == caip2)
            .map(|e| e.value().clone()))
    }

    fn list(&self) -> Result<Vec<ChainRecord>, StoreError> {
        self.outage.check()?;
        let mut all: Vec<ChainRecord> = self.chains.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.caip2.cmp(&b.caip2));
        Ok(all)
    }
}
