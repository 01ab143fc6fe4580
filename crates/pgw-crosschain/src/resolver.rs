//! # Chain Resolver
//!
//! Resolves a caller-supplied chain identifier in any of its three forms to
//! one canonical [`ChainRecord`]. Lookup order is internal UUID, then CAIP-2,
//! then legacy chain id.
//!
//! Every form that matches must name the same record. If the UUID form names
//! one chain and the legacy form another, the input is ambiguous and is
//! rejected rather than resolved by precedence.

use std::sync::Arc;

use pgw_core::{Caip2, ChainRecord, ChainRecordId};
use pgw_registry::ChainRegistry;
use uuid::Uuid;

use crate::error::CrosschainError;

#[derive(Clone)]
pub struct ChainResolver {
    chains: Arc<dyn ChainRegistry>,
}

impl ChainResolver {
    pub fn new(chains: Arc<dyn ChainRegistry>) -> Self {
        Self { chains }
    }

    /// Resolve `input` to its chain record.
    ///
    /// # Errors
    ///
    /// - [`CrosschainError::ChainNotFound`] when no form matches.
    /// - [`CrosschainError::AmbiguousChain`] when forms match different records.
    /// - [`CrosschainError::Store`] when the registry fails.
    pub fn resolve(&self, input: &str) -> Result<ChainRecord, CrosschainError> {
        let trimmed = input.trim();
        let mut matches: Vec<ChainRecord> = Vec::with_capacity(3);

        if let Ok(uuid) = Uuid::parse_str(trimmed) {
            if let Some(rec) = self.chains.get_by_id(&ChainRecordId::from_uuid(uuid))? {
                matches.push(rec);
            }
        }
        if Caip2::is_candidate(trimmed) {
            if let Ok(caip2) = Caip2::parse(trimmed) {
                if let Some(rec) = self.chains.get_by_caip2(&caip2)? {
                    matches.push(rec);
                }
            }
        }
        if let Some(rec) = self.chains.get_by_chain_id(trimmed)? {
            matches.push(rec);
        }

        let mut found = matches.into_iter();
        let Some(first) = found.next() else {
            return Err(CrosschainError::ChainNotFound {
                input: trimmed.to_string(),
            });
        };
        let conflicting: Vec<ChainRecord> = found.filter(|r| r.id != first.id).collect();
        if !conflicting.is_empty() {
            let mut candidates: Vec<String> = std::iter::once(&first)
                .chain(conflicting.iter())
                .map(|r| r.caip2.to_string())
                .collect();
            candidates.sort();
            candidates.dedup();
            tracing::warn!(input = trimmed, ?candidates, "ambiguous chain identifier");
            return Err(CrosschainError::AmbiguousChain {
                input: trimmed.to_string(),
                candidates,
            });
        }
        tracing::debug!(input = trimmed, chain = %first.caip2, "chain resolved");
        Ok(first)
    }
}
