//! # apigw CLI entry point
//!
//! Parses command-line arguments, loads the optional config file and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use apigw_schema::SchemaDraft;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use apigw_cli::check::{run_check, CheckArgs};
use apigw_cli::config::CliConfig;
use apigw_cli::resolve::{run_resolve, ResolveArgs};
use apigw_cli::validate::{run_validate, ValidateArgs};
use apigw_cli::EXIT_ERROR;

/// Gateway configuration validator.
///
/// Validates routes, services, upstreams, consumers and SSL objects against
/// the gateway's schema registry before they are persisted.
#[derive(Parser, Debug)]
#[command(name = "apigw", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON Schema draft to compile schemas against (overrides the config file).
    #[arg(long, global = true)]
    draft: Option<SchemaDraft>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate an entity file for persistence.
    Validate(ValidateArgs),

    /// Check a document against a standalone schema file.
    Check(CheckArgs),

    /// Print the schema a registry path resolves to.
    Resolve(ResolveArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("apigw CLI starting");

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config.with_draft(cli.draft),
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &config),
        Commands::Check(args) => run_check(&args, &config),
        Commands::Resolve(args) => run_resolve(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
