//! # pgw-registry: Store Interfaces
//!
//! The crosschain engine reads chains, policies, bridge configs, and contract
//! metadata through four traits. Persistence lives behind them; this crate
//! ships `DashMap`-backed in-memory implementations used by tests, dry runs,
//! and the operator CLI.
//!
//! Every trait is `Send + Sync` and object safe so the engine can hold each
//! store as an `Arc<dyn …>`.

pub mod bridge_configs;
pub mod chains;
pub mod contracts;
pub mod error;
pub mod policies;

pub use bridge_configs::{BridgeConfigStore, InMemoryBridgeConfigStore};
pub use chains::{ChainRegistry, InMemoryChainRegistry};
pub use contracts::{ContractRegistry, InMemoryContractRegistry};
pub use error::StoreError;
pub use policies::{InMemoryRoutePolicyStore, RoutePolicyStore};
