//! Restore command implementation.
//!
//! Replays a snapshot with plain `SET`s. By default existing keys that are
//! not in the snapshot survive; `--clear` flushes the database first.

use crate::cli::RestoreArgs;
use crate::format::{CommandReport, OutputContext, format_import_report};
use keyspace_lib::snapshot::{self, ImportOptions, ImportReport};
use keyspace_lib::{KeyValueStore, RedisCli, Result, StoreConfig};
use std::path::Path;

/// Execute the restore command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read or a store call fails.
pub fn execute(args: &RestoreArgs, store_config: StoreConfig, ctx: &OutputContext) -> Result<()> {
    let mut store = RedisCli::new(store_config);
    let report = run(&mut store, &args.file, ImportOptions { clear: args.clear })?;

    if ctx.is_json() {
        ctx.json(&CommandReport {
            command: "restore",
            report: &report,
        })?;
    } else {
        ctx.text(&format_import_report(
            &args.file.display().to_string(),
            &report,
        ));
    }
    Ok(())
}

/// Load `path` and replay it into the store.
///
/// The snapshot is parsed completely before the first write, so a malformed
/// file never leaves a half-restored (or flushed) database.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read or a store call fails.
pub fn run(
    store: &mut impl KeyValueStore,
    path: &Path,
    options: ImportOptions,
) -> Result<ImportReport> {
    let records = snapshot::load(path)?;
    tracing::info!(records = records.len(), "loaded snapshot {}", path.display());
    snapshot::import(store, &records, options)
}
