//! Counters recorded through the `metrics` facade.
//!
//! Only the metric names are public. Recording is a no-op until the host
//! process installs a recorder.

use crate::report::{RouteStatus, StepStatus};

pub const AUDITS_TOTAL: &str = "pgw_audits_total";
pub const AUTOFIX_STEPS_TOTAL: &str = "pgw_autofix_steps_total";
pub const BULK_ROUTE_FAILURES_TOTAL: &str = "pgw_bulk_route_failures_total";

pub(crate) fn record_audit(status: RouteStatus) {
    metrics::counter!(AUDITS_TOTAL, "status" => status.as_str()).increment(1);
}

pub(crate) fn record_step(step: &str, status: StepStatus) {
    metrics::counter!(
        AUTOFIX_STEPS_TOTAL,
        "step" => step.to_string(),
        "status" => status.as_str()
    )
    .increment(1);
}

pub(crate) fn record_bulk_failure() {
    metrics::counter!(BULK_ROUTE_FAILURES_TOTAL).increment(1);
}
