//! # Report Types
//!
//! Structured outputs of the engine: audit check items and route status,
//! preflight verdicts, autofix results, and route error diagnostics. All
//! serialize to camelCase JSON with SCREAMING enum values.
//!
//! Audit reports carry no timestamps so that auditing an unchanged route
//! twice yields equal values.

use pgw_core::{BridgeType, Caip2, ChainRecord, ChainRecordId};
use serde::{Deserialize, Serialize};

/// Severity of one check item. Ordered: `Ok < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Ok,
    Warn,
    Error,
}

/// Overall route status, the worst item severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteStatus {
    Ready,
    Degraded,
    Error,
}

impl RouteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Degraded => "DEGRADED",
            Self::Error => "ERROR",
        }
    }
}

impl From<CheckStatus> for RouteStatus {
    fn from(status: CheckStatus) -> Self {
        match status {
            CheckStatus::Ok => Self::Ready,
            CheckStatus::Warn => Self::Degraded,
            CheckStatus::Error => Self::Error,
        }
    }
}

impl std::fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrepancy classes reported by the audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckCode {
    PolicyMissing,
    ContractMissing,
    DefaultBridgeMismatch,
    BridgeConfigMissing,
    BridgeConfigInactive,
    AdapterContractMissing,
    BridgeNotRegistered,
    BridgeConfigMismatch,
    OnchainQueryFailed,
}

impl CheckCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PolicyMissing => "POLICY_MISSING",
            Self::ContractMissing => "CONTRACT_MISSING",
            Self::DefaultBridgeMismatch => "DEFAULT_BRIDGE_MISMATCH",
            Self::BridgeConfigMissing => "BRIDGE_CONFIG_MISSING",
            Self::BridgeConfigInactive => "BRIDGE_CONFIG_INACTIVE",
            Self::AdapterContractMissing => "ADAPTER_CONTRACT_MISSING",
            Self::BridgeNotRegistered => "BRIDGE_NOT_REGISTERED",
            Self::BridgeConfigMismatch => "BRIDGE_CONFIG_MISMATCH",
            Self::OnchainQueryFailed => "ONCHAIN_QUERY_FAILED",
        }
    }

    /// Severity this code is always reported with.
    pub fn status(self) -> CheckStatus {
        match self {
            Self::DefaultBridgeMismatch | Self::BridgeConfigInactive => CheckStatus::Warn,
            _ => CheckStatus::Error,
        }
    }
}

impl std::fmt::Display for CheckCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractConfigCheckItem {
    pub code: CheckCode,
    pub status: CheckStatus,
    pub message: String,
    /// Protocol the finding concerns, if protocol-specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_type: Option<BridgeType>,
}

impl ContractConfigCheckItem {
    pub fn new(code: CheckCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: code.status(),
            message: message.into(),
            bridge_type: None,
        }
    }

    pub fn for_bridge(code: CheckCode, bridge: BridgeType, message: impl Into<String>) -> Self {
        Self {
            bridge_type: Some(bridge),
            ..Self::new(code, message)
        }
    }
}

/// One endpoint of an audited route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub chain_record_id: ChainRecordId,
    pub chain_id: String,
    pub caip2: Caip2,
}

impl From<&ChainRecord> for RouteLeg {
    fn from(record: &ChainRecord) -> Self {
        Self {
            chain_record_id: record.id,
            chain_id: record.chain_id.clone(),
            caip2: record.caip2.clone(),
        }
    }
}

/// Audit result for one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosschainRouteStatus {
    /// `source->dest` in CAIP-2 form.
    pub route_key: String,
    pub source: RouteLeg,
    pub dest: RouteLeg,
    pub status: RouteStatus,
    /// Only non-OK findings; empty for a `READY` route.
    pub items: Vec<ContractConfigCheckItem>,
}

impl CrosschainRouteStatus {
    /// Build a status whose overall severity is the worst item's.
    pub fn from_items(source: &ChainRecord, dest: &ChainRecord, items: Vec<ContractConfigCheckItem>) -> Self {
        let worst = items
            .iter()
            .map(|i| i.status)
            .fold(CheckStatus::Ok, CheckStatus::max);
        Self {
            route_key: route_key(source, dest),
            source: source.into(),
            dest: dest.into(),
            status: worst.into(),
            items,
        }
    }

    pub fn has(&self, code: CheckCode) -> bool {
        self.items.iter().any(|i| i.code == code)
    }

    pub fn has_for(&self, code: CheckCode, bridge: BridgeType) -> bool {
        self.items
            .iter()
            .any(|i| i.code == code && i.bridge_type == Some(bridge))
    }
}

/// Canonical route key.
pub fn route_key(source: &ChainRecord, dest: &ChainRecord) -> String {
    format!("{}->{}", source.caip2, dest.caip2)
}

/// Verdict of a preflight check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightResult {
    pub route_key: String,
    pub executable: bool,
    /// Route status when the audit completed; `None` if it could not run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RouteStatus>,
    /// Blocking and non-blocking reasons, one per finding.
    pub reasons: Vec<String>,
}

/// Outcome of one autofix step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepStatus {
    Success,
    Failed,
    Skipped,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFixStep {
    /// Operation name (`setDefaultBridgeType`, `registerAdapter`, ...).
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_type: Option<BridgeType>,
    pub status: StepStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

/// Result of an autofix run on one route. Steps appear in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFixResult {
    pub route_key: String,
    /// Route status observed before any step ran; `None` if the audit failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_before: Option<RouteStatus>,
    pub steps: Vec<AutoFixStep>,
    pub summary: String,
}

impl AutoFixResult {
    /// Result for a route whose processing failed before any step ran.
    pub fn failed(route_key: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            route_key: route_key.into(),
            status_before: None,
            steps: vec![AutoFixStep {
                name: "autoFix".to_string(),
                bridge_type: None,
                status: StepStatus::Failed,
                message: message.clone(),
                tx_hash: None,
            }],
            summary: message,
        }
    }

    /// Whether no step failed.
    pub fn is_success(&self) -> bool {
        self.steps.iter().all(|s| s.status != StepStatus::Failed)
    }

    pub fn failed_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
            .count()
    }
}

/// Diagnosis of a payment's last route failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteErrorDiagnostics {
    pub payment_id: String,
    pub source_chain: Caip2,
    pub gateway_address: String,
    /// Whether the gateway has an error recorded for the payment.
    pub found: bool,
    /// Raw revert payload as hex; `None` when nothing is recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_hex: Option<String>,
    pub decoded: String,
}

/// A route named by caller-supplied chain identifiers (any form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub source: String,
    pub dest: String,
}

impl RouteRequest {
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }

    /// Route key from the raw identifiers, used when resolution fails.
    pub fn key(&self) -> String {
        format!("{}->{}", self.source, self.dest)
    }
}

/// One route's audit in a bulk recheck: its status or why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAuditOutcome {
    pub route_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CrosschainRouteStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
