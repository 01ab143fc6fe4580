//! # pgw-onchain: Adapter Gateway Interface
//!
//! Everything the crosschain engine knows about contract state comes through
//! [`AdapterGateway`]: reads of the gateway's default bridge types and adapter
//! registrations, reads of each adapter's route config, the recorded route
//! error for a payment, and the corrective writes autofix issues.
//!
//! ## Implementations
//!
//! - [`InMemoryAdapterGateway`]: full storage state machine with failure
//!   injection, for tests and dry runs.
//! - `EvmAdapterGateway` (feature `evm-rpc`): JSON-RPC over HTTPS.
//!   Signing is delegated to the endpoint.
//!
//! ## Bridge type codes
//!
//! Contracts store bridge types as `uint8`: `0` unset, `1` HYPERBRIDGE,
//! `2` CCIP, `3` LAYERZERO. See [`pgw_core::BridgeType::from_code`].

pub mod abi;
pub mod context;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod revert;

#[cfg(feature = "evm-rpc")]
pub mod evm;

pub use context::CallContext;
pub use error::GatewayError;
pub use gateway::{apply_route_config, ops, AdapterGateway, GatewayTarget, TxReceipt};
pub use memory::{InMemoryAdapterGateway, RecordedCall};
pub use revert::{decode_revert, RevertReason};

#[cfg(feature = "evm-rpc")]
pub use evm::{EvmAdapterGateway, EvmEndpoint};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn gateway_trait_is_object_safe() {
        let gw: Arc<dyn AdapterGateway> = Arc::new(InMemoryAdapterGateway::new());
        assert_eq!(gw.gateway_name(), "InMemoryAdapterGateway");
    }
}
