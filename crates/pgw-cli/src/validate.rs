//! # Validate Subcommand
//!
//! Loads a manifest, validating every chain, contract, policy, and bridge
//! config, and prints a summary of what it holds.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::{manifest, write_json, EXIT_OK};

/// Arguments for the `pgw validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also audit every declared route and include the results.
    #[arg(long)]
    pub audit: bool,
}

pub fn run_validate(args: &ValidateArgs, manifest_path: &Path, out: &mut dyn Write) -> Result<u8> {
    let deployment = manifest::open(manifest_path)?;
    if args.audit {
        let outcomes = deployment.engine.audit().audit_all()?;
        write_json(
            out,
            &serde_json::json!({
                "manifest": deployment.summary,
                "routes": outcomes,
            }),
        )?;
    } else {
        write_json(out, &deployment.summary)?;
    }
    Ok(EXIT_OK)
}
