//! Configuration management for `keyspace_migrate`.
//!
//! Settings come from command-line flags, falling back to environment
//! variables and then to built-in defaults (clap resolves the precedence):
//! - `REDIS_HOST` / `--host` (default `127.0.0.1`)
//! - `REDIS_PORT` / `--port` (default `6379`)
//! - `REDIS_CLI` / `--redis-cli` (default `redis-cli` on `PATH`)
//!
//! They are read once at startup and passed down as explicit values.

use keyspace_lib::StoreConfig;

use crate::cli::{BackupArgs, ConnectionArgs};
use crate::sync::HistoryConfig;

/// Build the connection handle every store call uses.
#[must_use]
pub fn store_config(args: &ConnectionArgs) -> StoreConfig {
    StoreConfig {
        program: args.redis_cli.clone(),
        host: args.host.clone(),
        port: args.port,
    }
}

/// History settings for a backup run.
#[must_use]
pub fn history_config(args: &BackupArgs) -> HistoryConfig {
    HistoryConfig {
        enabled: !args.no_history,
        max_count: args.history_max_count,
        max_age_days: args.history_max_age_days,
    }
}
