//! Snapshot export/import.
//!
//! A snapshot is one JSON array of `{"key": ..., "value": ...}` records, one
//! per key that held a value at export time:
//!
//! ```json
//! [{"key": "item:g:default:123-asdf", "value": "{\"name\":\"widget\"}"}]
//! ```

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KeyspaceError, Result};
use crate::store::KeyValueStore;

/// Default snapshot file name, relative to the working directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = "items.json";

/// One exported key and its raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackupRecord {
    pub key: String,
    pub value: String,
}

impl BackupRecord {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Outcome of an export pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    /// Keys returned by the listing.
    pub scanned: usize,
    /// Keys that held no value when read.
    pub missing: usize,
    pub exported: usize,
}

/// Knobs for replaying a snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Flush the database before replaying.
    pub clear: bool,
}

/// Outcome of an import pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub cleared: bool,
    pub written: usize,
}

/// Read every key and its value from the store.
///
/// Keys listed but gone by the time they are read are left out, so the
/// record count matches the keys that actually held a value. A value that is
/// the empty string is still a value and is exported.
///
/// # Errors
///
/// Returns an error on the first failed store call.
pub fn export(store: &mut impl KeyValueStore) -> Result<(Vec<BackupRecord>, ExportReport)> {
    let keys = store.keys()?;
    let mut report = ExportReport {
        scanned: keys.len(),
        ..ExportReport::default()
    };
    let mut records = Vec::with_capacity(keys.len());

    for key in keys {
        match store.get(&key)? {
            Some(value) => records.push(BackupRecord { key, value }),
            None => {
                tracing::debug!(key = %key, "skipping key without a value");
                report.missing += 1;
            }
        }
    }

    report.exported = records.len();
    Ok((records, report))
}

/// Replay records into the store, overwriting existing values.
///
/// Without `clear`, keys absent from the snapshot are left untouched.
///
/// # Errors
///
/// Returns an error on the first failed store call; earlier writes stay.
pub fn import(
    store: &mut impl KeyValueStore,
    records: &[BackupRecord],
    options: ImportOptions,
) -> Result<ImportReport> {
    if options.clear {
        tracing::info!("flushing database before restore");
        store.flush()?;
    }

    for record in records {
        store.set(&record.key, &record.value)?;
    }

    Ok(ImportReport {
        cleared: options.clear,
        written: records.len(),
    })
}

/// Load records from a snapshot file.
///
/// # Errors
///
/// Returns `FileNotFound` if the file does not exist, `Io` if it cannot be
/// read, or `SnapshotParse` if it is not an array of records.
pub fn load(path: &Path) -> Result<Vec<BackupRecord>> {
    let file = fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            KeyspaceError::FileNotFound(path.to_path_buf())
        } else {
            KeyspaceError::Io(e)
        }
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| KeyspaceError::SnapshotParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Save records to a snapshot file with atomic write.
///
/// Non-ASCII text is written as UTF-8, not escaped. Uses write-to-temp +
/// rename so a failed run never leaves a truncated snapshot behind.
///
/// # Errors
///
/// Returns `Io` if the file cannot be written.
pub fn save(path: &Path, records: &[BackupRecord]) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let file = fs::File::create(&tmp_path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, records)?;
    writer.flush()?;
    drop(writer);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    /// Lists keys it has no value for, like a store where keys expire
    /// between `KEYS` and `GET`.
    struct ExpiringStore {
        inner: InMemoryStore,
        ghosts: Vec<String>,
    }

    impl KeyValueStore for ExpiringStore {
        fn keys(&mut self) -> Result<Vec<String>> {
            let mut keys = self.ghosts.clone();
            keys.extend(self.inner.keys()?);
            Ok(keys)
        }

        fn get(&mut self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.inner.set(key, value)
        }

        fn flush(&mut self) -> Result<()> {
            self.inner.flush()
        }
    }

    #[test]
    fn export_empty_store_is_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");

        let (records, report) = export(&mut InMemoryStore::new()).unwrap();
        assert!(records.is_empty());
        assert_eq!(report.exported, 0);

        save(&path, &records).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn export_skips_keys_without_values() {
        let mut store = ExpiringStore {
            inner: [("item:1", "{}")].into_iter().collect(),
            ghosts: vec![String::new(), "item:expired".to_string()],
        };

        let (records, report) = export(&mut store).unwrap();
        assert_eq!(records, vec![BackupRecord::new("item:1", "{}")]);
        assert_eq!(report.scanned, 3);
        assert_eq!(report.missing, 2);
    }

    #[test]
    fn export_keeps_empty_key_with_value() {
        let mut store: InMemoryStore = [("", "v")].into_iter().collect();
        let (records, _) = export(&mut store).unwrap();
        assert_eq!(records, vec![BackupRecord::new("", "v")]);
    }

    #[test]
    fn export_keeps_empty_string_values() {
        let mut store: InMemoryStore = [("item:empty", ""), ("item:1", "{}")].into_iter().collect();
        let (records, report) = export(&mut store).unwrap();
        assert_eq!(
            records,
            vec![
                BackupRecord::new("item:1", "{}"),
                BackupRecord::new("item:empty", ""),
            ]
        );
        assert_eq!(report.missing, 0);

        let mut restored = InMemoryStore::new();
        import(&mut restored, &records, ImportOptions::default()).unwrap();
        assert_eq!(restored.peek("item:empty"), Some(""));
    }

    #[test]
    fn save_writes_utf8_and_double_encodes_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        let records = vec![BackupRecord::new("item:g:default:1", r#"{"name":"café"}"#)];

        save(&path, &records).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            r#"[{"key":"item:g:default:1","value":"{\"name\":\"café\"}"}]"#
        );
        assert!(!dir.path().join("items.json.tmp").exists());
        assert_eq!(load(&path).unwrap(), records);
    }

    #[test]
    fn load_missing_file() {
        let err = load(Path::new("/nonexistent/items.json")).unwrap_err();
        assert!(matches!(err, KeyspaceError::FileNotFound(_)));
    }

    #[test]
    fn load_rejects_malformed_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");

        fs::write(&path, r#"{"key": "a", "value": "b"}"#).unwrap();
        assert!(matches!(
            load(&path).unwrap_err(),
            KeyspaceError::SnapshotParse { .. }
        ));

        fs::write(&path, r#"[{"key": "a", "value": 1}]"#).unwrap();
        assert!(matches!(
            load(&path).unwrap_err(),
            KeyspaceError::SnapshotParse { .. }
        ));
    }

    #[test]
    fn import_empty_snapshot_writes_nothing() {
        let mut store = InMemoryStore::new();
        let report = import(&mut store, &[], ImportOptions::default()).unwrap();
        assert_eq!(report.written, 0);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn import_merges_by_default() {
        let mut store: InMemoryStore = [("keep", "1"), ("item:1", "old")].into_iter().collect();
        let records = vec![BackupRecord::new("item:1", "new")];

        import(&mut store, &records, ImportOptions::default()).unwrap();
        assert_eq!(store.peek("keep"), Some("1"));
        assert_eq!(store.peek("item:1"), Some("new"));
    }

    #[test]
    fn import_with_clear_replaces_keyspace() {
        let mut store: InMemoryStore = [("keep", "1")].into_iter().collect();
        let records = vec![BackupRecord::new("item:1", "new")];

        let report = import(&mut store, &records, ImportOptions { clear: true }).unwrap();
        assert!(report.cleared);
        assert!(store.peek("keep").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn import_twice_is_idempotent() {
        let records = vec![
            BackupRecord::new("item:1", "a"),
            BackupRecord::new("item:2", "b"),
        ];
        let mut store = InMemoryStore::new();

        import(&mut store, &records, ImportOptions::default()).unwrap();
        let first = store.entries().clone();
        import(&mut store, &records, ImportOptions::default()).unwrap();

        assert_eq!(store.entries(), &first);
        assert_eq!(store.write_count(), 4);
    }
}
