//! # pgw-cli: Crosschain Operator CLI
//!
//! Loads a deployment manifest and runs the reconciliation engine against
//! it. Reports are JSON on stdout; logs go to stderr.
//!
//! ## Subcommands
//!
//! - `validate`: Load and validate a manifest, print what it contains
//! - `audit` / `audit-all`: Audit one route or every declared route
//! - `preflight`: Executable verdict for one route
//! - `autofix` / `autofix-bulk`: Issue corrective writes
//! - `decode-error`: Explain a payment's last recorded route failure
//!
//! ## Exit codes
//!
//! - `0`: success
//! - `1`: operational error (bad manifest, unknown chain, store or RPC failure)
//! - `2`: route not executable (`preflight`) or a failed autofix step

pub mod diagnose;
pub mod manifest;
pub mod route;
pub mod validate;

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

pub const EXIT_OK: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_NOT_EXECUTABLE: u8 = 2;

/// Pretty JSON followed by a newline.
pub fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    writeln!(out, "{json}").context("failed to write report")?;
    Ok(())
}
