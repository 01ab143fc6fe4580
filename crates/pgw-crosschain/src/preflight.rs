//! # Preflight Evaluator
//!
//! Projects an audit onto a single go/no-go verdict. A route is executable
//! unless its audit status is `ERROR`; warnings are listed as reasons but do
//! not block. Preflight never fails: if the audit itself cannot run, the
//! route is reported non-executable with the failure as its reason.

use crate::audit::ConfigAuditEngine;
use crate::report::{CrosschainRouteStatus, PreflightResult, RouteRequest, RouteStatus};

#[derive(Clone)]
pub struct PreflightEvaluator {
    audit: ConfigAuditEngine,
}

impl PreflightEvaluator {
    pub fn new(audit: ConfigAuditEngine) -> Self {
        Self { audit }
    }

    pub fn preflight(&self, source: &str, dest: &str) -> PreflightResult {
        match self.audit.audit(source, dest) {
            Ok(status) => evaluate(&status),
            Err(err) => {
                let route_key = RouteRequest::new(source, dest).key();
                tracing::warn!(route = %route_key, error = %err, "preflight audit failed");
                PreflightResult {
                    route_key,
                    executable: false,
                    status: None,
                    reasons: vec![err.to_string()],
                }
            }
        }
    }
}

/// Verdict for an already-computed audit.
pub fn evaluate(status: &CrosschainRouteStatus) -> PreflightResult {
    PreflightResult {
        route_key: status.route_key.clone(),
        executable: status.status != RouteStatus::Error,
        status: Some(status.status),
        reasons: status
            .items
            .iter()
            .map(|item| format!("[{}] {}", item.code, item.message))
            .collect(),
    }
}
