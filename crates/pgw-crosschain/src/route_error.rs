//! # Route Error Decoder
//!
//! Reads the last route failure a source-chain gateway recorded for a
//! payment and explains it. "Nothing recorded" is a normal answer, reported
//! with `found: false`.

use std::sync::Arc;

use pgw_core::hex::encode_hex;
use pgw_core::{ContractType, PaymentId, ValidationError};
use pgw_onchain::{decode_revert, AdapterGateway, CallContext, GatewayTarget};

use crate::config::EngineConfig;
use crate::engine::Registries;
use crate::error::CrosschainError;
use crate::report::RouteErrorDiagnostics;
use crate::resolver::ChainResolver;

#[derive(Clone)]
pub struct RouteErrorDecoder {
    registries: Registries,
    resolver: ChainResolver,
    gateway: Arc<dyn AdapterGateway>,
    config: EngineConfig,
}

impl RouteErrorDecoder {
    pub fn new(registries: Registries, gateway: Arc<dyn AdapterGateway>, config: EngineConfig) -> Self {
        Self {
            resolver: ChainResolver::new(registries.chains.clone()),
            registries,
            gateway,
            config,
        }
    }

    /// Diagnose `payment_id_hex` (32 bytes) on `source_chain`.
    ///
    /// # Errors
    ///
    /// - [`CrosschainError::Validation`] on a malformed payment id.
    /// - [`CrosschainError::NotFound`] when the chain has no gateway contract.
    /// - Resolution, store, and gateway failures.
    pub fn decode(&self, source_chain: &str, payment_id_hex: &str) -> Result<RouteErrorDiagnostics, CrosschainError> {
        let payment_id = PaymentId::from_hex(payment_id_hex)
            .map_err(|e| ValidationError::single("paymentId", e.to_string()))?;
        let chain = self.resolver.resolve(source_chain)?;
        let gateway_record = self
            .registries
            .contracts
            .active_contract(&chain.id, ContractType::Gateway)?
            .ok_or_else(|| CrosschainError::NotFound {
                entity: "gateway contract",
                key: chain.caip2.to_string(),
            })?;
        let target = GatewayTarget {
            chain: chain.caip2.clone(),
            family: chain.family,
            gateway_address: gateway_record.address,
        };

        let ctx = CallContext::with_timeout(self.config.rpc_timeout);
        let raw = self.gateway.last_route_error(&ctx, &target, &payment_id)?;
        let (found, raw_hex, decoded) = match raw {
            Some(data) => (true, Some(encode_hex(&data)), decode_revert(&data).to_string()),
            None => (
                false,
                None,
                format!("no route error recorded for payment {payment_id}"),
            ),
        };
        tracing::info!(payment = %payment_id, chain = %target.chain, found, "route error decoded");
        Ok(RouteErrorDiagnostics {
            payment_id: payment_id.to_hex(),
            source_chain: target.chain,
            gateway_address: target.gateway_address,
            found,
            raw_hex,
            decoded,
        })
    }
}
