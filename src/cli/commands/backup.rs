//! Backup command implementation.
//!
//! Exports every key to the snapshot file. The previous snapshot, if any,
//! is copied into history first.

use crate::cli::BackupArgs;
use crate::config;
use crate::format::{CommandReport, OutputContext, format_export_report};
use crate::sync::{HistoryConfig, preserve_before_export};
use keyspace_lib::snapshot::{self, ExportReport};
use keyspace_lib::{KeyValueStore, RedisCli, Result, StoreConfig};
use std::path::Path;

/// Execute the backup command.
///
/// # Errors
///
/// Returns an error if a store call fails or the snapshot cannot be written.
pub fn execute(args: &BackupArgs, store_config: StoreConfig, ctx: &OutputContext) -> Result<()> {
    let mut store = RedisCli::new(store_config);
    let history = config::history_config(args);
    let report = run(&mut store, &args.file, &history)?;

    let path = args.file.display().to_string();
    if ctx.is_json() {
        ctx.json(&CommandReport {
            command: "backup",
            report: &report,
        })?;
    } else {
        ctx.text(&format_export_report(&path, &report));
    }
    Ok(())
}

/// Export the store into `path`.
///
/// The store is read completely before the file is touched, so a failed
/// export leaves the previous snapshot in place.
///
/// # Errors
///
/// Returns an error if a store call fails or the snapshot cannot be written.
pub fn run(
    store: &mut impl KeyValueStore,
    path: &Path,
    history: &HistoryConfig,
) -> Result<ExportReport> {
    let (records, report) = snapshot::export(store)?;

    if let Some(kept) = preserve_before_export(path, history)? {
        tracing::info!("previous snapshot kept as {}", kept.display());
    }
    snapshot::save(path, &records)?;

    tracing::info!(
        records = report.exported,
        "wrote snapshot {}",
        path.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::history::{history_dir_for, list_history};
    use keyspace_lib::InMemoryStore;
    use std::fs;

    #[test]
    fn backup_writes_snapshot_and_keeps_previous() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("items.json");
        fs::write(&path, "[]").unwrap();

        let mut store: InMemoryStore = [("item:1", "{}")].into_iter().collect();
        let report = run(&mut store, &path, &HistoryConfig::default()).unwrap();

        assert_eq!(report.exported, 1);
        assert_eq!(
            snapshot::load(&path).unwrap(),
            vec![snapshot::BackupRecord::new("item:1", "{}")]
        );
        let history = list_history(&history_dir_for(&path), "items").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(fs::read_to_string(&history[0].path).unwrap(), "[]");
    }

    #[test]
    fn empty_store_backs_up_to_empty_array() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("items.json");

        let report = run(&mut InMemoryStore::new(), &path, &HistoryConfig::default()).unwrap();
        assert_eq!(report.exported, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
