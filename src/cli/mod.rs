//! Command-line interface for `keyspace_migrate`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use keyspace_lib::redis_cli::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PROGRAM};
use keyspace_lib::snapshot::DEFAULT_SNAPSHOT_FILE;
use std::path::PathBuf;

use crate::format::OutputContext;
use crate::logging;

/// `ksm` - migrate, back up and restore item keys in a Redis keyspace.
#[derive(Parser, Debug)]
#[command(name = "ksm")]
#[command(
    author,
    version,
    about = "Migrate, back up and restore item keys in a Redis keyspace",
    long_about = None,
    after_help = "Every command is a single sequential pass through redis-cli. \
                  Nothing else may write to the database while it runs."
)]
pub struct Cli {
    /// Print the run report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// How to reach the store.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Server host
    #[arg(long, global = true, env = "REDIS_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Server port
    #[arg(long, global = true, env = "REDIS_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Path to the redis-cli binary
    #[arg(long = "redis-cli", global = true, env = "REDIS_CLI", default_value = DEFAULT_PROGRAM)]
    pub redis_cli: String,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy `item*` keys to `item:global:<uuid>`, replacing `id` with `uid`
    MigrateV1(MigrateArgs),

    /// Copy keys outside `item:global:` to `item:g:default:<id>`
    MigrateV2(MigrateArgs),

    /// Export every key and value to a JSON snapshot
    Backup(BackupArgs),

    /// Replay a JSON snapshot into the store
    Restore(RestoreArgs),

    /// Show version information
    Version,
}

#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Read and transform, but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Snapshot file to write
    #[arg(long, default_value = DEFAULT_SNAPSHOT_FILE)]
    pub file: PathBuf,

    /// Do not keep a copy of the snapshot being replaced
    #[arg(long)]
    pub no_history: bool,

    /// Number of previous snapshots to keep
    #[arg(long, default_value_t = 20)]
    pub history_max_count: usize,

    /// Drop previous snapshots older than this many days
    #[arg(long, default_value_t = 30)]
    pub history_max_age_days: u32,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Snapshot file to read
    #[arg(long, default_value = DEFAULT_SNAPSHOT_FILE)]
    pub file: PathBuf,

    /// Flush the database before restoring (default: merge, overwriting)
    #[arg(long)]
    pub clear: bool,
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, None)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let ctx = OutputContext::new(cli.json, cli.quiet);
    let store_config = crate::config::store_config(&cli.connection);
    tracing::debug!(
        host = %store_config.host,
        port = store_config.port,
        command = cli.command.name(),
        "starting"
    );

    match &cli.command {
        Commands::MigrateV1(args) => commands::migrate::execute_v1(args, store_config, &ctx)?,
        Commands::MigrateV2(args) => commands::migrate::execute_v2(args, store_config, &ctx)?,
        Commands::Backup(args) => commands::backup::execute(args, store_config, &ctx)?,
        Commands::Restore(args) => commands::restore::execute(args, store_config, &ctx)?,
        Commands::Version => commands::version::execute(&ctx)?,
    }

    Ok(())
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::MigrateV1(_) => "migrate-v1",
            Self::MigrateV2(_) => "migrate-v2",
            Self::Backup(_) => "backup",
            Self::Restore(_) => "restore",
            Self::Version => "version",
        }
    }
}
