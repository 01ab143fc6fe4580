//! # pgw CLI entry point
//!
//! Parses command-line arguments, initialises logging, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pgw_cli::diagnose::{run_decode_error, DecodeErrorArgs};
use pgw_cli::route::{
    run_audit, run_audit_all, run_autofix, run_autofix_bulk, run_preflight, BulkArgs, RouteArgs,
};
use pgw_cli::validate::{run_validate, ValidateArgs};
use pgw_cli::EXIT_ERROR;

/// Payment gateway crosschain operator CLI.
///
/// Audits crosschain routes against their declared policy, decides whether
/// they are executable, and repairs on-chain configuration drift.
#[derive(Parser, Debug)]
#[command(name = "pgw", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Deployment manifest (YAML).
    #[arg(long, short, global = true, default_value = "pgw.yaml")]
    manifest: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and validate the manifest.
    Validate(ValidateArgs),

    /// Audit one route.
    Audit(RouteArgs),

    /// Audit every route that has a policy.
    AuditAll,

    /// Decide whether a route is executable.
    Preflight(RouteArgs),

    /// Correct one route's on-chain configuration.
    Autofix(RouteArgs),

    /// Correct several routes, one after another.
    AutofixBulk(BulkArgs),

    /// Decode the last route error recorded for a payment.
    DecodeError(DecodeErrorArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!(manifest = %cli.manifest.display(), "pgw starting");

    let mut stdout = std::io::stdout().lock();
    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &cli.manifest, &mut stdout),
        Commands::Audit(args) => run_audit(args, &cli.manifest, &mut stdout),
        Commands::AuditAll => run_audit_all(&cli.manifest, &mut stdout),
        Commands::Preflight(args) => run_preflight(args, &cli.manifest, &mut stdout),
        Commands::Autofix(args) => run_autofix(args, &cli.manifest, &mut stdout),
        Commands::AutofixBulk(args) => run_autofix_bulk(args, &cli.manifest, &mut stdout),
        Commands::DecodeError(args) => run_decode_error(args, &cli.manifest, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_audit() {
        let cli = Cli::try_parse_from([
            "pgw",
            "audit",
            "--source",
            "eip155:8453",
            "--dest",
            "42161",
        ])
        .unwrap();
        match cli.command {
            Commands::Audit(args) => {
                assert_eq!(args.source, "eip155:8453");
                assert_eq!(args.dest, "42161");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(cli.manifest, PathBuf::from("pgw.yaml"));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pgw", "audit-all", "-vv", "--log-json", "--manifest", "deploy.yaml",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::AuditAll));
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert_eq!(cli.manifest, PathBuf::from("deploy.yaml"));
    }

    #[test]
    fn parse_bulk_routes_in_pairs() {
        let cli = Cli::try_parse_from([
            "pgw",
            "autofix-bulk",
            "--route",
            "8453",
            "42161",
            "--route",
            "8453",
            "10",
        ])
        .unwrap();
        match cli.command {
            Commands::AutofixBulk(args) => assert_eq!(args.route, vec!["8453", "42161", "8453", "10"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_decode_error() {
        let cli = Cli::try_parse_from(["pgw", "decode-error", "--chain", "8453", "--payment", "0xab"]).unwrap();
        assert!(matches!(cli.command, Commands::DecodeError(_)));
    }

    #[test]
    fn audit_requires_both_chains() {
        assert!(Cli::try_parse_from(["pgw", "audit", "--source", "8453"]).is_err());
    }
}
