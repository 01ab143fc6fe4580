//! # Revert Payload Decoding
//!
//! Turns raw revert data recorded by the gateway into a readable reason.
//! Recognizes the two built-in Solidity errors and the gateway's own custom
//! errors; anything else is reported with its selector.

use crate::abi::{selector, AbiError, AbiReader};
use pgw_core::hex::encode_hex;
use pgw_core::BridgeType;

/// `Error(string)`.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
/// `Panic(uint256)`.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

const ROUTE_NOT_CONFIGURED: &str = "RouteNotConfigured(string)";
const ADAPTER_NOT_REGISTERED: &str = "AdapterNotRegistered(string,uint8)";
const BRIDGE_SEND_FAILED: &str = "BridgeSendFailed(uint8,bytes)";
const INSUFFICIENT_FEE: &str = "InsufficientFee(uint256,uint256)";

/// Nested `BridgeSendFailed` payloads are decoded at most this deep.
const MAX_NESTING: usize = 4;

/// A decoded revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// Revert with no data (`revert()` or `require(cond)`).
    Empty,
    /// `Error(string)`.
    Message(String),
    /// `Panic(uint256)`.
    Panic { code: u128 },
    RouteNotConfigured { dest_chain: String },
    AdapterNotRegistered { dest_chain: String, bridge_code: u8 },
    /// The adapter call reverted; `inner` is its own decoded revert.
    BridgeSendFailed { bridge_code: u8, inner: Box<RevertReason> },
    InsufficientFee { required: u128, provided: u128 },
    /// Known selector whose arguments failed to decode.
    Malformed { error: &'static str, reason: String },
    /// Selector not in the table.
    Unrecognized { selector: [u8; 4], data_len: usize },
}

/// Human description of a Solidity panic code.
pub fn panic_description(code: u128) -> &'static str {
    match code {
        0x00 => "generic compiler panic",
        0x01 => "assertion failed",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum conversion",
        0x22 => "corrupted storage byte array",
        0x31 => "pop on empty array",
        0x32 => "array index out of bounds",
        0x41 => "out of memory",
        0x51 => "call to uninitialized function pointer",
        _ => "unknown panic code",
    }
}

fn bridge_label(code: u8) -> String {
    match BridgeType::from_code(code) {
        Ok(Some(bt)) => bt.to_string(),
        Ok(None) => "UNSET".to_string(),
        Err(_) => format!("bridge type {code}"),
    }
}

impl std::fmt::Display for RevertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("reverted without a reason"),
            Self::Message(msg) => write!(f, "Error: {msg}"),
            Self::Panic { code } => write!(f, "Panic(0x{code:02x}): {}", panic_description(*code)),
            Self::RouteNotConfigured { dest_chain } => {
                write!(f, "RouteNotConfigured: no route configured to {dest_chain}")
            }
            Self::AdapterNotRegistered {
                dest_chain,
                bridge_code,
            } => write!(
                f,
                "AdapterNotRegistered: no {} adapter registered for {dest_chain}",
                bridge_label(*bridge_code)
            ),
            Self::BridgeSendFailed { bridge_code, inner } => write!(
                f,
                "BridgeSendFailed: {} adapter reverted ({inner})",
                bridge_label(*bridge_code)
            ),
            Self::InsufficientFee { required, provided } => write!(
                f,
                "InsufficientFee: required {required}, provided {provided}"
            ),
            Self::Malformed { error, reason } => write!(f, "malformed {error} payload: {reason}"),
            Self::Unrecognized { selector, data_len } => write!(
                f,
                "unrecognized error selector {} ({data_len} bytes)",
                encode_hex(selector)
            ),
        }
    }
}

/// Decode raw revert data.
pub fn decode_revert(data: &[u8]) -> RevertReason {
    decode_at_depth(data, 0)
}

fn decode_at_depth(data: &[u8], depth: usize) -> RevertReason {
    if data.is_empty() {
        return RevertReason::Empty;
    }
    if data.len() < 4 {
        return RevertReason::Unrecognized {
            selector: [0; 4],
            data_len: data.len(),
        };
    }
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&data[..4]);
    let args = AbiReader::new(&data[4..]);

    let decoded: Result<RevertReason, (&'static str, AbiError)> = if sel == ERROR_STRING_SELECTOR {
        args.string(0)
            .map(RevertReason::Message)
            .map_err(|e| ("Error(string)", e))
    } else if sel == PANIC_SELECTOR {
        args.uint(0, 128)
            .map(|code| RevertReason::Panic { code })
            .map_err(|e| ("Panic(uint256)", e))
    } else if sel == selector(ROUTE_NOT_CONFIGURED) {
        args.string(0)
            .map(|dest_chain| RevertReason::RouteNotConfigured { dest_chain })
            .map_err(|e| (ROUTE_NOT_CONFIGURED, e))
    } else if sel == selector(ADAPTER_NOT_REGISTERED) {
        args.string(0)
            .and_then(|dest_chain| {
                let bridge_code = args.uint(1, 8)? as u8;
                Ok(RevertReason::AdapterNotRegistered {
                    dest_chain,
                    bridge_code,
                })
            })
            .map_err(|e| (ADAPTER_NOT_REGISTERED, e))
    } else if sel == selector(BRIDGE_SEND_FAILED) {
        args.uint(0, 8)
            .and_then(|code| {
                let inner = args.bytes(1)?;
                let inner = if depth + 1 >= MAX_NESTING {
                    RevertReason::Unrecognized {
                        selector: [0; 4],
                        data_len: inner.len(),
                    }
                } else {
                    decode_at_depth(&inner, depth + 1)
                };
                Ok(RevertReason::BridgeSendFailed {
                    bridge_code: code as u8,
                    inner: Box::new(inner),
                })
            })
            .map_err(|e| (BRIDGE_SEND_FAILED, e))
    } else if sel == selector(INSUFFICIENT_FEE) {
        args.uint(0, 128)
            .and_then(|required| {
                let provided = args.uint(1, 128)?;
                Ok(RevertReason::InsufficientFee { required, provided })
            })
            .map_err(|e| (INSUFFICIENT_FEE, e))
    } else {
        Ok(RevertReason::Unrecognized {
            selector: sel,
            data_len: data.len(),
        })
    };

    decoded.unwrap_or_else(|(error, e)| RevertReason::Malformed {
        error,
        reason: e.to_string(),
    })
}
