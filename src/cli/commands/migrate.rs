//! Namespace migration commands.
//!
//! `migrate-v1` copies legacy `item*` keys under `item:global:<uuid>`;
//! `migrate-v2` copies everything outside `item:global:` under
//! `item:g:default:<id>`. Source keys are never deleted.

use crate::cli::MigrateArgs;
use crate::format::{CommandReport, OutputContext, format_migration_report};
use keyspace_lib::migrate::{self, MigrateOptions, MigrationReport};
use keyspace_lib::{KeyValueStore, RedisCli, Result, StoreConfig};

/// Execute the migrate-v1 command.
///
/// # Errors
///
/// Returns an error on the first failed store call or undecodable value.
pub fn execute_v1(args: &MigrateArgs, config: StoreConfig, ctx: &OutputContext) -> Result<()> {
    let mut store = RedisCli::new(config);
    let report = run_v1(&mut store, args)?;
    print_report("migrate-v1", &report, ctx)
}

/// Execute the migrate-v2 command.
///
/// # Errors
///
/// Returns an error on the first failed store call.
pub fn execute_v2(args: &MigrateArgs, config: StoreConfig, ctx: &OutputContext) -> Result<()> {
    let mut store = RedisCli::new(config);
    let report = run_v2(&mut store, args)?;
    print_report("migrate-v2", &report, ctx)
}

/// Run the first migration against any store.
///
/// # Errors
///
/// Propagates the first failure of the pass.
pub fn run_v1(store: &mut impl KeyValueStore, args: &MigrateArgs) -> Result<MigrationReport> {
    let options = options(args);
    let report = migrate::migrate_to_global(store, options)?;
    tracing::info!(written = report.written, "migrated keys to item:global");
    Ok(report)
}

/// Run the second migration against any store.
///
/// # Errors
///
/// Propagates the first failure of the pass.
pub fn run_v2(store: &mut impl KeyValueStore, args: &MigrateArgs) -> Result<MigrationReport> {
    let options = options(args);
    let report = migrate::migrate_to_default_namespace(store, options)?;
    tracing::info!(written = report.written, "migrated keys to item:g:default");
    Ok(report)
}

const fn options(args: &MigrateArgs) -> MigrateOptions {
    MigrateOptions {
        dry_run: args.dry_run,
    }
}

fn print_report(command: &str, report: &MigrationReport, ctx: &OutputContext) -> Result<()> {
    if ctx.is_json() {
        ctx.json(&CommandReport { command, report })?;
    } else {
        ctx.text(&format_migration_report(command, report));
    }
    Ok(())
}
