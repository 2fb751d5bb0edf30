//! Local history of snapshot files.
//!
//! This module handles:
//! - Copying the previous snapshot aside before `backup` replaces it
//! - Rotating copies by count and age
//! - Listing copies, newest first

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use keyspace_lib::{KeyspaceError, Result};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Directory, next to the snapshot, that holds previous snapshots.
pub const HISTORY_DIR_NAME: &str = ".ksm_history";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Configuration for snapshot history.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub max_count: usize,
    pub max_age_days: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_count: 20,
            max_age_days: 30,
        }
    }
}

/// History entry metadata.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub path: PathBuf,
    pub timestamp: DateTime<Utc>,
    /// Counter distinguishing copies taken within the same second.
    pub seq: usize,
    pub size: u64,
}

/// History directory for a snapshot path.
#[must_use]
pub fn history_dir_for(snapshot: &Path) -> PathBuf {
    snapshot
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(HISTORY_DIR_NAME)
}

fn snapshot_stem(snapshot: &Path) -> String {
    snapshot
        .file_stem()
        .map_or_else(|| "items".to_string(), |s| s.to_string_lossy().into_owned())
}

/// Copy the current snapshot into history before it is overwritten.
///
/// Returns the path of the new copy, or `None` when there was nothing to
/// keep (history disabled, no snapshot yet, or identical to the newest copy).
///
/// # Errors
///
/// Returns an error if the copy cannot be created or rotation fails.
pub fn preserve_before_export(snapshot: &Path, config: &HistoryConfig) -> Result<Option<PathBuf>> {
    if !config.enabled || !snapshot.exists() {
        return Ok(None);
    }

    let history_dir = history_dir_for(snapshot);
    let stem = snapshot_stem(snapshot);

    if !history_dir.exists() {
        fs::create_dir_all(&history_dir).map_err(KeyspaceError::Io)?;
    }

    if let Some(latest) = list_history(&history_dir, &stem)?.into_iter().next() {
        if files_are_identical(snapshot, &latest.path)? {
            tracing::debug!(
                "Skipping history copy: identical to {}",
                latest.path.display()
            );
            return Ok(None);
        }
    }

    let now = Utc::now();
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    let copy_path = next_copy_path(&history_dir, &stem, &timestamp);
    fs::copy(snapshot, &copy_path).map_err(KeyspaceError::Io)?;
    tracing::debug!("Kept previous snapshot as {}", copy_path.display());

    rotate_history(&history_dir, &stem, config, now)?;

    Ok(Some(copy_path))
}

/// First free copy path for `timestamp`.
///
/// `<stem>.<timestamp>.json`, then `<stem>.<timestamp>-1.json`, `-2` and so on
/// when backups run more than once in the same second.
fn next_copy_path(history_dir: &Path, stem: &str, timestamp: &str) -> PathBuf {
    let mut path = history_dir.join(format!("{stem}.{timestamp}.json"));
    let mut seq = 0usize;
    while path.exists() {
        seq += 1;
        path = history_dir.join(format!("{stem}.{timestamp}-{seq}.json"));
    }
    path
}

/// Split `<timestamp>[-<seq>]` from a copy's file name.
fn parse_copy_name(name: &str) -> Option<(DateTime<Utc>, usize)> {
    let (ts_str, seq) = match name.split_once('-') {
        Some((ts, seq)) => (ts, seq.parse().ok()?),
        None => (name, 0),
    };
    let naive = NaiveDateTime::parse_from_str(ts_str, TIMESTAMP_FORMAT).ok()?;
    Some((Utc.from_utc_datetime(&naive), seq))
}

/// Delete copies beyond `max_count` or older than `max_age_days`.
///
/// # Errors
///
/// Returns an error if listing or deleting copies fails.
pub fn rotate_history(
    history_dir: &Path,
    stem: &str,
    config: &HistoryConfig,
    now: DateTime<Utc>,
) -> Result<usize> {
    let entries = list_history(history_dir, stem)?;
    let cutoff = now - chrono::Duration::days(i64::from(config.max_age_days));

    let mut deleted_count = 0;
    for (idx, entry) in entries.iter().enumerate() {
        if entry.timestamp < cutoff || idx >= config.max_count {
            fs::remove_file(&entry.path).map_err(KeyspaceError::Io)?;
            deleted_count += 1;
        }
    }

    if deleted_count > 0 {
        tracing::debug!("Pruned {} old snapshot(s)", deleted_count);
    }

    Ok(deleted_count)
}

/// List copies of `<stem>.json` sorted by date and counter (newest first).
///
/// Files whose name does not carry a valid timestamp are ignored.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn list_history(history_dir: &Path, stem: &str) -> Result<Vec<HistoryEntry>> {
    if !history_dir.exists() {
        return Ok(Vec::new());
    }

    let prefix = format!("{stem}.");
    let mut entries = Vec::new();

    for dir_entry in fs::read_dir(history_dir)? {
        let path = dir_entry?.path();
        if !path.is_file() {
            continue;
        }

        let Some((timestamp, seq)) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(&prefix))
            .and_then(|n| n.strip_suffix(".json"))
            .and_then(parse_copy_name)
        else {
            continue;
        };

        let size = fs::metadata(&path)?.len();
        entries.push(HistoryEntry {
            path,
            timestamp,
            seq,
            size,
        });
    }

    entries.sort_by(|a, b| (b.timestamp, b.seq).cmp(&(a.timestamp, a.seq)));
    Ok(entries)
}

/// Compare two files byte by byte.
fn files_are_identical(p1: &Path, p2: &Path) -> Result<bool> {
    let f1 = File::open(p1)?;
    let f2 = File::open(p2)?;

    if f1.metadata()?.len() != f2.metadata()?.len() {
        return Ok(false);
    }

    let mut b1 = Vec::new();
    let mut b2 = Vec::new();
    BufReader::new(f1).read_to_end(&mut b1)?;
    BufReader::new(f2).read_to_end(&mut b2)?;
    Ok(b1 == b2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_snapshot_means_no_copy() {
        let temp = TempDir::new().unwrap();
        let snapshot = temp.path().join("items.json");

        let kept = preserve_before_export(&snapshot, &HistoryConfig::default()).unwrap();
        assert!(kept.is_none());
        assert!(!temp.path().join(HISTORY_DIR_NAME).exists());
    }

    #[test]
    fn disabled_history_keeps_nothing() {
        let temp = TempDir::new().unwrap();
        let snapshot = temp.path().join("items.json");
        fs::write(&snapshot, "[]").unwrap();

        let config = HistoryConfig {
            enabled: false,
            ..HistoryConfig::default()
        };
        assert!(preserve_before_export(&snapshot, &config).unwrap().is_none());
    }

    #[test]
    fn identical_snapshot_is_copied_once() {
        let temp = TempDir::new().unwrap();
        let snapshot = temp.path().join("items.json");
        fs::write(&snapshot, "[]").unwrap();
        let config = HistoryConfig::default();

        assert!(preserve_before_export(&snapshot, &config).unwrap().is_some());
        assert!(preserve_before_export(&snapshot, &config).unwrap().is_none());

        let history = list_history(&history_dir_for(&snapshot), "items").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].size, 2);
    }

    #[test]
    fn listing_parses_timestamps_newest_first() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("items.20230101_100000.json"), "a").unwrap();
        fs::write(dir.join("items.20230102_100000.json"), "b").unwrap();
        fs::write(dir.join("items.invalid_name.json"), "c").unwrap();
        fs::write(dir.join("items.20230101_100000-x.json"), "c").unwrap();
        fs::write(dir.join("other.20230103_100000.json"), "d").unwrap();

        let history = list_history(dir, "items").unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].path.to_string_lossy().contains("20230102"));
        assert!(history[1].path.to_string_lossy().contains("20230101"));
    }

    #[test]
    fn copies_in_the_same_second_get_a_counter() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        let ts = "20230101_100000";

        assert_eq!(next_copy_path(dir, "items", ts), dir.join("items.20230101_100000.json"));
        fs::write(dir.join("items.20230101_100000.json"), "a").unwrap();
        assert_eq!(next_copy_path(dir, "items", ts), dir.join("items.20230101_100000-1.json"));
        fs::write(dir.join("items.20230101_100000-1.json"), "b").unwrap();
        assert_eq!(next_copy_path(dir, "items", ts), dir.join("items.20230101_100000-2.json"));
        fs::write(dir.join("items.20230101_100000-2.json"), "c").unwrap();

        let history = list_history(dir, "items").unwrap();
        let seqs: Vec<_> = history.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![2, 1, 0]);
        assert_eq!(fs::read_to_string(&history[0].path).unwrap(), "c");
    }

    #[test]
    fn back_to_back_backups_keep_both_copies() {
        let temp = TempDir::new().unwrap();
        let snapshot = temp.path().join("items.json");
        let config = HistoryConfig::default();

        fs::write(&snapshot, "[]").unwrap();
        let first = preserve_before_export(&snapshot, &config).unwrap().unwrap();
        fs::write(&snapshot, r#"[{"key":"k","value":"v"}]"#).unwrap();
        let second = preserve_before_export(&snapshot, &config).unwrap().unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read_to_string(&first).unwrap(), "[]");
        let history = list_history(&history_dir_for(&snapshot), "items").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].path, second);
    }

    #[test]
    fn rotation_drops_excess_and_expired_copies() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        for name in [
            "items.20230101_100000.json",
            "items.20230110_100000.json",
            "items.20230111_100000.json",
            "items.20230112_100000.json",
        ] {
            fs::write(dir.join(name), "x").unwrap();
        }

        let now = Utc.with_ymd_and_hms(2023, 1, 15, 0, 0, 0).unwrap();
        let config = HistoryConfig {
            enabled: true,
            max_count: 2,
            max_age_days: 10,
        };

        let deleted = rotate_history(dir, "items", &config, now).unwrap();
        assert_eq!(deleted, 2);

        let left: Vec<_> = list_history(dir, "items")
            .unwrap()
            .into_iter()
            .map(|e| e.timestamp)
            .collect();
        assert_eq!(
            left,
            vec![
                Utc.with_ymd_and_hms(2023, 1, 12, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 1, 11, 10, 0, 0).unwrap(),
            ]
        );
    }
}
