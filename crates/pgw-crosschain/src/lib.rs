//! # pgw-crosschain: Crosschain Configuration Reconciliation
//!
//! Decides whether a payment route between two chains is configured the way
//! its operator declared, and repairs it when it is not.
//!
//! ## Components
//!
//! - [`ChainResolver`]: any chain identifier form to one [`pgw_core::ChainRecord`].
//! - [`BridgeConfigValidator`]: all-or-nothing validation and normalization of
//!   route policy and bridge config payloads.
//! - [`ConfigAuditEngine`]: stored declarations vs. live gateway and adapter
//!   state, as structured check items.
//! - [`PreflightEvaluator`]: executable / not executable, with reasons.
//! - [`AutoFixOrchestrator`]: ordered corrective writes, single and bulk.
//! - [`RouteErrorDecoder`]: a payment's last recorded route failure, decoded.
//! - [`ConfigAdmin`]: validated upserts and deletes.
//!
//! [`CrosschainEngine`] wires them to one set of stores and one gateway.
//!
//! ## Timeouts
//!
//! Every audit, autofix, and decode creates one
//! [`CallContext`](pgw_onchain::CallContext) from
//! [`EngineConfig::rpc_timeout`] and passes it to every chain call it makes.
//! Bulk operations create one per route.

pub mod admin;
pub mod audit;
pub mod autofix;
pub mod config;
pub mod engine;
pub mod error;
pub mod preflight;
pub mod report;
pub mod resolver;
pub mod route_error;
pub mod telemetry;
pub mod validator;

#[cfg(test)]
mod fixtures;

pub use admin::ConfigAdmin;
pub use audit::ConfigAuditEngine;
pub use autofix::AutoFixOrchestrator;
pub use config::EngineConfig;
pub use engine::{CrosschainEngine, Registries};
pub use error::{ConfigError, CrosschainError};
pub use preflight::PreflightEvaluator;
pub use report::{
    AutoFixResult, AutoFixStep, CheckCode, CheckStatus, ContractConfigCheckItem,
    CrosschainRouteStatus, PreflightResult, RouteAuditOutcome, RouteErrorDiagnostics, RouteLeg,
    RouteRequest, RouteStatus, StepStatus,
};
pub use resolver::ChainResolver;
pub use route_error::RouteErrorDecoder;
pub use validator::{BridgeConfigInput, BridgeConfigValidator, NumericInput, RoutePolicyInput};
