//! # pgw-core: Foundational Types for the Crosschain Layer
//!
//! Leaf crate of the `pgw` workspace. Defines the value types every other
//! crate passes around when reasoning about crosschain routes:
//!
//! - **Chain identity** ([`chain`]): `ChainRecord`, `ChainFamily`, and the
//!   validated `Caip2` identifier (`namespace:reference`).
//! - **Bridge protocols** ([`bridge`]): the closed `BridgeType` enum with its
//!   on-chain code table, and `FallbackMode`.
//! - **Hex canonicalization** ([`hex`]): `0x` prefixing, lower-casing, and
//!   fixed-width left padding for addresses and peers.
//! - **Route policy** ([`policy`]) and **bridge configuration**
//!   ([`bridge_config`]): the stored declarations the audit engine compares
//!   against live contract state.
//! - **Contracts** ([`contract`]): deployed gateway and adapter metadata.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pgw-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.
//! - Identifiers are newtypes; hex values held in records are always canonical.

pub mod bridge;
pub mod bridge_config;
pub mod chain;
pub mod contract;
pub mod error;
pub mod hex;
pub mod identity;
pub mod policy;

pub use bridge::{BridgeType, FallbackMode, ParseBridgeTypeError, BRIDGE_TYPE_UNSET_CODE};
pub use bridge_config::{BridgeConfig, CcipConfig, HyperbridgeConfig, LayerZeroConfig, ProtocolConfig};
pub use chain::{Caip2, Caip2Error, ChainFamily, ChainRecord};
pub use contract::{ContractType, SmartContractRecord};
pub use error::{FieldViolation, ValidationError};
pub use hex::HexError;
pub use identity::{BridgeConfigId, ChainRecordId, ContractId, PaymentId, PolicyId};
pub use policy::{RoutePair, RoutePolicy};
