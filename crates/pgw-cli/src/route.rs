//! # Route Subcommands
//!
//! `audit`, `audit-all`, `preflight`, `autofix`, and `autofix-bulk`.
//! Chains may be named in any identifier form (internal id, CAIP-2, or
//! legacy chain id).

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;

use pgw_crosschain::RouteRequest;

use crate::{manifest, write_json, EXIT_NOT_EXECUTABLE, EXIT_OK};

/// A single route.
#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    /// Source chain.
    #[arg(long)]
    pub source: String,

    /// Destination chain.
    #[arg(long)]
    pub dest: String,
}

/// Arguments for `pgw autofix-bulk`.
#[derive(Args, Debug, Clone)]
pub struct BulkArgs {
    /// Route to fix, as `--route <SOURCE> <DEST>`. Repeatable. Defaults to
    /// every declared route.
    #[arg(long, num_args = 2, value_names = ["SOURCE", "DEST"])]
    pub route: Vec<String>,
}

impl BulkArgs {
    fn requests(&self) -> Result<Vec<RouteRequest>> {
        if self.route.len() % 2 != 0 {
            bail!("--route takes a source and a destination");
        }
        Ok(self
            .route
            .chunks(2)
            .map(|pair| RouteRequest::new(pair[0].clone(), pair[1].clone()))
            .collect())
    }
}

pub fn run_audit(args: &RouteArgs, manifest_path: &Path, out: &mut dyn Write) -> Result<u8> {
    let deployment = manifest::open(manifest_path)?;
    let status = deployment.engine.audit().audit(&args.source, &args.dest)?;
    write_json(out, &status)?;
    Ok(EXIT_OK)
}

pub fn run_audit_all(manifest_path: &Path, out: &mut dyn Write) -> Result<u8> {
    let deployment = manifest::open(manifest_path)?;
    let outcomes = deployment.engine.audit().audit_all()?;
    write_json(out, &outcomes)?;
    Ok(EXIT_OK)
}

pub fn run_preflight(args: &RouteArgs, manifest_path: &Path, out: &mut dyn Write) -> Result<u8> {
    let deployment = manifest::open(manifest_path)?;
    let result = deployment.engine.preflight().preflight(&args.source, &args.dest);
    write_json(out, &result)?;
    Ok(if result.executable {
        EXIT_OK
    } else {
        EXIT_NOT_EXECUTABLE
    })
}

pub fn run_autofix(args: &RouteArgs, manifest_path: &Path, out: &mut dyn Write) -> Result<u8> {
    let deployment = manifest::open(manifest_path)?;
    let result = deployment.engine.autofix().auto_fix(&args.source, &args.dest)?;
    write_json(out, &result)?;
    Ok(if result.is_success() {
        EXIT_OK
    } else {
        EXIT_NOT_EXECUTABLE
    })
}

pub fn run_autofix_bulk(args: &BulkArgs, manifest_path: &Path, out: &mut dyn Write) -> Result<u8> {
    let deployment = manifest::open(manifest_path)?;
    let mut routes = args.requests()?;
    if routes.is_empty() {
        routes = deployment.engine.audit().declared_routes()?;
    }
    let results = deployment.engine.autofix().auto_fix_bulk(&routes);
    write_json(out, &results)?;
    Ok(if results.iter().all(|r| r.is_success()) {
        EXIT_OK
    } else {
        EXIT_NOT_EXECUTABLE
    })
}
