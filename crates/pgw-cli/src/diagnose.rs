//! # Decode-Error Subcommand
//!
//! Reads the last route failure recorded for a payment and prints the raw
//! payload alongside its decoded reason.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::{manifest, write_json, EXIT_OK};

/// Arguments for `pgw decode-error`.
#[derive(Args, Debug)]
pub struct DecodeErrorArgs {
    /// Source chain whose gateway recorded the failure.
    #[arg(long)]
    pub chain: String,

    /// Payment id, 32 bytes as hex.
    #[arg(long)]
    pub payment: String,
}

pub fn run_decode_error(args: &DecodeErrorArgs, manifest_path: &Path, out: &mut dyn Write) -> Result<u8> {
    let deployment = manifest::open(manifest_path)?;
    let diagnostics = deployment
        .engine
        .route_errors()
        .decode(&args.chain, &args.payment)?;
    write_json(out, &diagnostics)?;
    Ok(EXIT_OK)
}
