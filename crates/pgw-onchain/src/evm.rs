//! # EVM JSON-RPC Adapter Gateway
//!
//! Live gateway for EVM chains (Ethereum, Base, Arbitrum, Optimism).
//!
//! ## How It Works
//!
//! 1. Reads are `eth_call`s against the gateway or adapter contract, with
//!    calldata built by [`crate::abi`].
//! 2. Writes are `eth_sendTransaction`s. The JSON-RPC endpoint signs: the
//!    `from` address must be unlocked or managed by the provider's signing
//!    service. This gateway holds no private keys.
//! 3. After submission the receipt is polled until the transaction is mined
//!    or the [`CallContext`] deadline passes. A mined transaction with status
//!    `0x0` is reported as rejected.
//!
//! Every HTTP request's timeout is the context's remaining time, so one slow
//! endpoint cannot stall an audit past its deadline.

use std::collections::HashMap;
use std::time::Duration;

use pgw_core::hex::{decode_hex, encode_hex, is_zero};
use pgw_core::{
    BridgeType, Caip2, CcipConfig, ChainFamily, HyperbridgeConfig, LayerZeroConfig, PaymentId,
    ProtocolConfig,
};

use crate::abi::{encode_call, AbiReader, Token};
use crate::context::CallContext;
use crate::error::GatewayError;
use crate::gateway::{ops, AdapterGateway, GatewayTarget, TxReceipt};

/// RPC endpoint for one chain.
#[derive(Debug, Clone)]
pub struct EvmEndpoint {
    pub chain: Caip2,
    /// JSON-RPC URL (HTTPS in production).
    pub rpc_url: String,
    /// Sender whose transactions the endpoint signs (0x-prefixed).
    pub from_address: String,
}

/// EVM JSON-RPC implementation of [`AdapterGateway`].
///
/// Owns a current-thread Tokio runtime and blocks on it, so it must be
/// called from synchronous code, not from inside another async runtime.
#[derive(Debug)]
pub struct EvmAdapterGateway {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    endpoints: HashMap<Caip2, EvmEndpoint>,
    receipt_poll: Duration,
}

const SIG_DEFAULT_BRIDGE_TYPES: &str = "defaultBridgeTypes(string)";
const SIG_ADAPTERS: &str = "adapters(string,uint8)";
const SIG_LAST_ROUTE_ERROR: &str = "lastRouteError(bytes32)";
const SIG_ROUTE_CONFIG: &str = "routeConfig(string)";
const SIG_SET_DEFAULT_BRIDGE_TYPE: &str = "setDefaultBridgeType(string,uint8)";
const SIG_REGISTER_ADAPTER: &str = "registerAdapter(string,uint8,address)";
const SIG_SET_HYPERBRIDGE: &str = "setRouteConfig(string,bytes,bytes)";
const SIG_SET_CCIP: &str = "setRouteConfig(string,uint64,bytes)";
const SIG_SET_LAYERZERO: &str = "setRouteConfig(string,uint32,bytes32,bytes)";

/// Validate that a string is a well-formed EVM address (0x + 40 hex chars).
fn is_valid_eth_address(addr: &str) -> bool {
    addr.len() == 42
        && addr.starts_with("0x")
        && addr[2..].chars().all(|c| c.is_ascii_hexdigit())
}

fn parse_quantity(value: &serde_json::Value) -> Option<u64> {
    value
        .as_str()
        .and_then(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok())
}

fn hex_arg(operation: &str, field: &str, value: &str) -> Result<Vec<u8>, GatewayError> {
    decode_hex(value).map_err(|e| GatewayError::Rejected {
        operation: operation.to_string(),
        reason: format!("{field}: {e}"),
    })
}

impl EvmAdapterGateway {
    /// Build a gateway over the given endpoints.
    ///
    /// # Errors
    ///
    /// `Rejected` for a malformed sender address, `Unavailable` if the HTTP
    /// client or runtime cannot be built.
    pub fn new(endpoints: Vec<EvmEndpoint>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            GatewayError::Unavailable {
                chain: "*".to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            }
        })?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| GatewayError::Unavailable {
                chain: "*".to_string(),
                reason: format!("failed to build async runtime: {e}"),
            })?;

        let mut by_chain = HashMap::new();
        for ep in endpoints {
            if !is_valid_eth_address(&ep.from_address) {
                return Err(GatewayError::Rejected {
                    operation: "configure".to_string(),
                    reason: format!("invalid from address for {}: {}", ep.chain, ep.from_address),
                });
            }
            by_chain.insert(ep.chain.clone(), ep);
        }

        Ok(Self {
            client,
            runtime,
            endpoints: by_chain,
            receipt_poll: Duration::from_millis(500),
        })
    }

    /// Interval between receipt polls after a write.
    pub fn with_receipt_poll(mut self, interval: Duration) -> Self {
        self.receipt_poll = interval;
        self
    }

    fn endpoint(&self, target: &GatewayTarget) -> Result<&EvmEndpoint, GatewayError> {
        if target.family != ChainFamily::Evm {
            return Err(GatewayError::Unsupported(format!(
                "{} is an {} chain; the EVM gateway only serves evm chains",
                target.chain, target.family
            )));
        }
        self.endpoints
            .get(&target.chain)
            .ok_or_else(|| GatewayError::Unavailable {
                chain: target.chain.to_string(),
                reason: "no RPC endpoint configured".to_string(),
            })
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(
        &self,
        ctx: &CallContext,
        endpoint: &EvmEndpoint,
        operation: &str,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        ctx.check(operation)?;
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&endpoint.rpc_url)
            .timeout(ctx.remaining())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::DeadlineExceeded {
                        operation: operation.to_string(),
                    }
                } else {
                    GatewayError::Unavailable {
                        chain: endpoint.chain.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        if !resp.status().is_success() {
            return Err(GatewayError::Unavailable {
                chain: endpoint.chain.to_string(),
                reason: format!("HTTP {}", resp.status()),
            });
        }

        let json: serde_json::Value = resp.json().await.map_err(|e| GatewayError::Unavailable {
            chain: endpoint.chain.to_string(),
            reason: format!("invalid JSON response: {e}"),
        })?;

        if let Some(error) = json.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown RPC error");
            let reason = match error.get("data").and_then(|d| d.as_str()) {
                Some(data) => format!("{msg} (data {data})"),
                None => msg.to_string(),
            };
            return Err(GatewayError::Rejected {
                operation: operation.to_string(),
                reason,
            });
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| GatewayError::Unavailable {
                chain: endpoint.chain.to_string(),
                reason: "JSON-RPC response missing 'result' field".to_string(),
            })
    }

    /// `eth_call` against `to`, returning the raw return data.
    fn call(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        operation: &str,
        to: &str,
        calldata: Vec<u8>,
    ) -> Result<Vec<u8>, GatewayError> {
        let endpoint = self.endpoint(target)?;
        tracing::debug!(chain = %target.chain, operation, to, "eth_call");
        let tx = serde_json::json!({ "to": to, "data": encode_hex(&calldata) });
        let result = self.runtime.block_on(self.rpc_call(
            ctx,
            endpoint,
            operation,
            "eth_call",
            serde_json::json!([tx, "latest"]),
        ))?;
        let hex = result
            .as_str()
            .ok_or_else(|| GatewayError::Decode("eth_call returned non-string result".into()))?;
        decode_hex(hex).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// `eth_sendTransaction` to `to`, then wait for the receipt.
    fn send(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        operation: &str,
        to: &str,
        calldata: Vec<u8>,
    ) -> Result<TxReceipt, GatewayError> {
        let endpoint = self.endpoint(target)?;
        tracing::debug!(chain = %target.chain, operation, to, "eth_sendTransaction");
        let tx = serde_json::json!({
            "from": endpoint.from_address,
            "to": to,
            "data": encode_hex(&calldata),
        });

        self.runtime.block_on(async {
            let result = self
                .rpc_call(
                    ctx,
                    endpoint,
                    operation,
                    "eth_sendTransaction",
                    serde_json::json!([tx]),
                )
                .await?;
            let tx_hash = result
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| GatewayError::Rejected {
                    operation: operation.to_string(),
                    reason: "eth_sendTransaction returned non-string result".to_string(),
                })?;

            loop {
                let receipt = self
                    .rpc_call(
                        ctx,
                        endpoint,
                        operation,
                        "eth_getTransactionReceipt",
                        serde_json::json!([&tx_hash]),
                    )
                    .await?;

                if receipt.is_null() {
                    if ctx.remaining() <= self.receipt_poll {
                        return Err(GatewayError::DeadlineExceeded {
                            operation: format!("{operation} (awaiting {tx_hash})"),
                        });
                    }
                    tokio::time::sleep(self.receipt_poll).await;
                    continue;
                }

                if receipt.get("status").and_then(parse_quantity) == Some(0) {
                    return Err(GatewayError::Rejected {
                        operation: operation.to_string(),
                        reason: format!("transaction {tx_hash} reverted"),
                    });
                }

                return Ok(TxReceipt {
                    tx_hash,
                    chain: target.chain.clone(),
                });
            }
        })
    }
}

fn dest_arg(dest: &str) -> Token {
    Token::String(dest.to_string())
}

impl AdapterGateway for EvmAdapterGateway {
    fn default_bridge_type(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
    ) -> Result<Option<BridgeType>, GatewayError> {
        let data = self.call(
            ctx,
            target,
            ops::DEFAULT_BRIDGE_TYPE,
            &target.gateway_address,
            encode_call(SIG_DEFAULT_BRIDGE_TYPES, &[dest_arg(dest)]),
        )?;
        let code = AbiReader::new(&data).uint(0, 8)? as u8;
        BridgeType::from_code(code).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    fn registered_adapter(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
        bridge: BridgeType,
    ) -> Result<Option<String>, GatewayError> {
        let data = self.call(
            ctx,
            target,
            ops::ADAPTERS,
            &target.gateway_address,
            encode_call(
                SIG_ADAPTERS,
                &[dest_arg(dest), Token::Uint(u128::from(bridge.code()))],
            ),
        )?;
        let address = AbiReader::new(&data).address(0)?;
        Ok(Some(encode_hex(&address)).filter(|a| !is_zero(a)))
    }

    fn route_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        bridge: BridgeType,
    ) -> Result<Option<ProtocolConfig>, GatewayError> {
        let data = self.call(
            ctx,
            target,
            ops::ROUTE_CONFIG,
            adapter,
            encode_call(SIG_ROUTE_CONFIG, &[dest_arg(dest)]),
        )?;
        let r = AbiReader::new(&data);
        let config = match bridge {
            BridgeType::Hyperbridge => {
                let state_machine_id = r.bytes(0)?;
                let destination_contract = r.bytes(1)?;
                if state_machine_id.is_empty() && destination_contract.is_empty() {
                    return Ok(None);
                }
                ProtocolConfig::Hyperbridge(HyperbridgeConfig {
                    state_machine_id: encode_hex(&state_machine_id),
                    destination_contract: encode_hex(&destination_contract),
                })
            }
            BridgeType::Ccip => {
                let chain_selector = r.uint(0, 64)? as u64;
                let destination_adapter = r.bytes(1)?;
                if chain_selector == 0 && destination_adapter.is_empty() {
                    return Ok(None);
                }
                ProtocolConfig::Ccip(CcipConfig {
                    chain_selector,
                    destination_adapter: encode_hex(&destination_adapter),
                })
            }
            BridgeType::LayerZero => {
                let dst_eid = r.uint(0, 32)? as u32;
                let peer = r.word(1)?;
                let options = r.bytes(2)?;
                if dst_eid == 0 && peer.iter().all(|b| *b == 0) && options.is_empty() {
                    return Ok(None);
                }
                ProtocolConfig::LayerZero(LayerZeroConfig {
                    dst_eid,
                    peer: encode_hex(&peer),
                    options: encode_hex(&options),
                })
            }
        };
        Ok(Some(config))
    }

    fn last_route_error(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        payment_id: &PaymentId,
    ) -> Result<Option<Vec<u8>>, GatewayError> {
        let data = self.call(
            ctx,
            target,
            ops::LAST_ROUTE_ERROR,
            &target.gateway_address,
            encode_call(
                SIG_LAST_ROUTE_ERROR,
                &[Token::FixedBytes32(*payment_id.as_bytes())],
            ),
        )?;
        let raw = AbiReader::new(&data).bytes(0)?;
        Ok(Some(raw).filter(|r| !r.is_empty()))
    }

    fn set_default_bridge_type(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
        bridge: BridgeType,
    ) -> Result<TxReceipt, GatewayError> {
        self.send(
            ctx,
            target,
            ops::SET_DEFAULT_BRIDGE_TYPE,
            &target.gateway_address,
            encode_call(
                SIG_SET_DEFAULT_BRIDGE_TYPE,
                &[dest_arg(dest), Token::Uint(u128::from(bridge.code()))],
            ),
        )
    }

    fn register_adapter(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        dest: &str,
        bridge: BridgeType,
        adapter: &str,
    ) -> Result<TxReceipt, GatewayError> {
        if !is_valid_eth_address(adapter) {
            return Err(GatewayError::Rejected {
                operation: ops::REGISTER_ADAPTER.to_string(),
                reason: format!("invalid adapter address: {adapter}"),
            });
        }
        let address = hex_arg(ops::REGISTER_ADAPTER, "adapter", adapter)?;
        self.send(
            ctx,
            target,
            ops::REGISTER_ADAPTER,
            &target.gateway_address,
            encode_call(
                SIG_REGISTER_ADAPTER,
                &[
                    dest_arg(dest),
                    Token::Uint(u128::from(bridge.code())),
                    Token::Address(address),
                ],
            ),
        )
    }

    fn set_hyperbridge_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        config: &HyperbridgeConfig,
    ) -> Result<TxReceipt, GatewayError> {
        let op = ops::SET_HYPERBRIDGE_CONFIG;
        let state_machine_id = hex_arg(op, "stateMachineId", &config.state_machine_id)?;
        let destination = hex_arg(op, "destinationContract", &config.destination_contract)?;
        self.send(
            ctx,
            target,
            op,
            adapter,
            encode_call(
                SIG_SET_HYPERBRIDGE,
                &[
                    dest_arg(dest),
                    Token::Bytes(state_machine_id),
                    Token::Bytes(destination),
                ],
            ),
        )
    }

    fn set_ccip_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        config: &CcipConfig,
    ) -> Result<TxReceipt, GatewayError> {
        let op = ops::SET_CCIP_CONFIG;
        let destination = hex_arg(op, "destinationAdapter", &config.destination_adapter)?;
        self.send(
            ctx,
            target,
            op,
            adapter,
            encode_call(
                SIG_SET_CCIP,
                &[
                    dest_arg(dest),
                    Token::Uint(u128::from(config.chain_selector)),
                    Token::Bytes(destination),
                ],
            ),
        )
    }

    fn set_layerzero_config(
        &self,
        ctx: &CallContext,
        target: &GatewayTarget,
        adapter: &str,
        dest: &str,
        config: &LayerZeroConfig,
    ) -> Result<TxReceipt, GatewayError> {
        let op = ops::SET_LAYERZERO_CONFIG;
        let peer_bytes = hex_arg(op, "peer", &config.peer)?;
        let peer: [u8; 32] = peer_bytes
            .as_slice()
            .try_into()
            .map_err(|_| GatewayError::Rejected {
                operation: op.to_string(),
                reason: format!("peer must be 32 bytes, got {}", peer_bytes.len()),
            })?;
        let options = hex_arg(op, "options", &config.options)?;
        self.send(
            ctx,
            target,
            op,
            adapter,
            encode_call(
                SIG_SET_LAYERZERO,
                &[
                    dest_arg(dest),
                    Token::Uint(u128::from(config.dst_eid)),
                    Token::FixedBytes32(peer),
                    Token::Bytes(options),
                ],
            ),
        )
    }

    fn gateway_name(&self) -> &str {
        "EvmAdapterGateway"
    }
}
