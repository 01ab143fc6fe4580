//! # Smart Contract Registry
//!
//! Deployed gateway and adapter contracts per chain. At most one record per
//! (chain, type) is active; registering a new active deployment retires the
//! previous one.

use dashmap::DashMap;
use pgw_core::hex::hex_eq;
use pgw_core::{ChainRecordId, ContractId, ContractType, SmartContractRecord};

use crate::error::{Outage, StoreError};

/// Persistence of deployed contract metadata.
pub trait ContractRegistry: Send + Sync {
    /// The active contract of `contract_type` on `chain`.
    fn active_contract(
        &self,
        chain: &ChainRecordId,
        contract_type: ContractType,
    ) -> Result<Option<SmartContractRecord>, StoreError>;

    /// Any record (active or retired) at `address` on `chain`.
    fn get_by_address(
        &self,
        chain: &ChainRecordId,
        address: &str,
    ) -> Result<Option<SmartContractRecord>, StoreError>;

    /// Every record on `chain`, ordered by type then address.
    fn list_for_chain(&self, chain: &ChainRecordId)
        -> Result<Vec<SmartContractRecord>, StoreError>;

    fn insert(&self, record: SmartContractRecord) -> Result<SmartContractRecord, StoreError>;
}

/// `DashMap`-backed contract registry.
#[derive(Debug, Default)]
pub struct InMemoryContractRegistry {
    contracts: DashMap<ContractId, SmartContractRecord>,
    outage: Outage,
}

impl InMemoryContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a backend outage (`Some(message)`) or clear it (`None`).
    pub fn set_outage(&self, message: Option<String>) {
        self.outage.set(message);
    }
}

impl ContractRegistry for InMemoryContractRegistry {
    fn active_contract(
        &self,
        chain: &ChainRecordId,
        contract_type: ContractType,
    ) -> Result<Option<SmartContractRecord>, StoreError> {
        self.outage.check()?;
        Ok(self
            .contracts
            .iter()
            .find(|e| {
                let c = e.value();
                &c.chain == chain && c.contract_type == contract_type && c.is_active
            })
            .map(|e| e.value().clone()))
    }

    fn get_by_address(
        &self,
        chain: &ChainRecordId,
        address: &str,
    ) -> Result<Option<SmartContractRecord>, StoreError> {
        self.outage.check()?;
        Ok(self
            .contracts
            .iter()
            .find(|e| &e.value().chain == chain && hex_eq(&e.value().address, address))
            .map(|e| e.value().clone()))
    }

    fn list_for_chain(
        &self,
        chain: &ChainRecordId,
    ) -> Result<Vec<SmartContractRecord>, StoreError> {
        self.outage.check()?;
        let mut out: Vec<SmartContractRecord> = self
            .contracts
            .iter()
            .filter(|e| &e.value().chain == chain)
            .map(|e| e.value().clone())
            .collect();
        out.sort_by(|a, b| {
            a.contract_type
                .cmp(&b.contract_type)
                .then_with(|| a.address.cmp(&b.address))
        });
        Ok(out)
    }

    fn insert(&self, record: SmartContractRecord) -> Result<SmartContractRecord, StoreError> {
        self.outage.check()?;
        if self.contracts.contains_key(&record.id) {
            return Err(StoreError::Conflict {
                entity: "contract",
                reason: format!("id {} already registered", record.id),
            });
        }
        if record.is_active {
            for mut entry in self.contracts.iter_mut() {
                let existing = entry.value_mut();
                if existing.chain == record.chain
                    && existing.contract_type == record.contract_type
                    && existing.is_active
                {
                    existing.is_active = false;
                    tracing::debug!(
                        contract = %existing.id,
                        address = %existing.address,
                        "contract retired by newer deployment"
                    );
                }
            }
        }
        self.contracts.insert(record.id, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_active_deployment_retires_previous() {
        let reg = InMemoryContractRegistry::new();
        let chain = ChainRecordId::new();
        let old = reg
            .insert(SmartContractRecord::new(chain, ContractType::Gateway, "0x01"))
            .unwrap();
        let new = reg
            .insert(SmartContractRecord::new(chain, ContractType::Gateway, "0x02"))
            .unwrap();
        let active = reg.active_contract(&chain, ContractType::Gateway).unwrap();
        assert_eq!(active.map(|c| c.id), Some(new.id));
        let retired = reg.get_by_address(&chain, "0x01").unwrap().unwrap();
        assert_eq!(retired.id, old.id);
        assert!(!retired.is_active);
    }

    #[test]
    fn active_lookup_is_per_chain_and_type() {
        let reg = InMemoryContractRegistry::new();
        let a = ChainRecordId::new();
        let b = ChainRecordId::new();
        reg.insert(SmartContractRecord::new(a, ContractType::Gateway, "0x01"))
            .unwrap();
        reg.insert(SmartContractRecord::new(a, ContractType::CcipAdapter, "0x02"))
            .unwrap();
        assert!(reg.active_contract(&b, ContractType::Gateway).unwrap().is_none());
        assert!(reg
            .active_contract(&a, ContractType::LayerZeroAdapter)
            .unwrap()
            .is_none());
        assert_eq!(reg.list_for_chain(&a).unwrap().len(), 2);
    }

    #[test]
    fn address_lookup_ignores_case() {
        let reg = InMemoryContractRegistry::new();
        let chain = ChainRecordId::new();
        reg.insert(SmartContractRecord::new(chain, ContractType::Gateway, "0xabcdef"))
            .unwrap();
        assert!(reg.get_by_address(&chain, "0xABCDEF").unwrap().is_some());
    }

    #[test]
    fn duplicate_id_conflicts() {
        let reg = InMemoryContractRegistry::new();
        let rec = SmartContractRecord::new(ChainRecordId::new(), ContractType::Gateway, "0x01");
        reg.insert(rec.clone()).unwrap();
        assert!(matches!(reg.insert(rec), Err(StoreError::Conflict { .. })));
    }
}
