//! Namespace migrations.
//!
//! Both migrations copy: the source key is left in place and the value is
//! written under the new key. Keys are listed once up front, so keys written
//! during the pass are never revisited. The pass assumes no other writer
//! touches the store while it runs.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{KeyspaceError, Result};
use crate::key::{self, ItemKey, KeyTier};
use crate::store::KeyValueStore;

/// Field removed from values by the first migration.
pub const LEGACY_ID_FIELD: &str = "id";

/// Field holding the key's identifier after the first migration.
pub const UID_FIELD: &str = "uid";

/// Knobs shared by both migrations.
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrateOptions {
    /// Read and transform, but do not write.
    pub dry_run: bool,
}

/// One source key and the key its value was written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMove {
    pub from: String,
    pub to: String,
}

/// Outcome of a migration pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    pub dry_run: bool,
    /// Keys returned by the listing.
    pub scanned: usize,
    /// Keys outside the migration's scope.
    pub skipped: usize,
    /// Keys that were listed but held no value when read.
    pub missing: usize,
    /// Values written (or that would have been, on a dry run).
    pub written: usize,
    /// Scanned keys per layout.
    pub tiers: BTreeMap<KeyTier, usize>,
    pub moves: Vec<KeyMove>,
}

impl MigrationReport {
    fn new(options: MigrateOptions) -> Self {
        Self {
            dry_run: options.dry_run,
            ..Self::default()
        }
    }

    fn scan(&mut self, keys: &[String]) {
        self.scanned = keys.len();
        for key in keys {
            *self.tiers.entry(key::classify(key)).or_default() += 1;
        }
    }

    fn record(&mut self, from: &str, to: String) {
        self.written += 1;
        self.moves.push(KeyMove {
            from: from.to_string(),
            to,
        });
    }
}

/// Replace the legacy `id` field of a JSON object value with `uid`.
///
/// # Errors
///
/// Returns `ValueDecode` if `raw` is not a JSON object and `MissingField`
/// if it has no `id`.
pub fn rewrite_identity(key: &str, raw: &str, uid: &str) -> Result<String> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| KeyspaceError::value_decode(key, e.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(KeyspaceError::value_decode(key, "expected an object"));
    };

    if fields.remove(LEGACY_ID_FIELD).is_none() {
        return Err(KeyspaceError::missing_field(key, LEGACY_ID_FIELD));
    }
    fields.insert(UID_FIELD.to_string(), Value::String(uid.to_string()));

    Ok(serde_json::to_string(&Value::Object(fields))?)
}

/// Copy every legacy item under `item:global:<uuid>` with a fresh identifier.
///
/// Keys starting with `item` are migrated unless they already sit under
/// `item:global:`. Each value loses its `id` field and gains a `uid` equal to
/// the new key's identifier.
///
/// # Errors
///
/// Aborts on the first store failure or undecodable value; values written
/// before the failure stay written.
pub fn migrate_to_global(
    store: &mut impl KeyValueStore,
    options: MigrateOptions,
) -> Result<MigrationReport> {
    let mut report = MigrationReport::new(options);
    let keys = store.keys()?;
    report.scan(&keys);

    for key in keys {
        if !key::is_item_key(&key) || key::is_legacy_global(&key) {
            report.skipped += 1;
            continue;
        }

        let target = ItemKey::new_legacy_global();
        let Some(raw) = store.get(&key)? else {
            tracing::warn!(key = %key, "key vanished before it could be read");
            report.missing += 1;
            continue;
        };

        let value = rewrite_identity(&key, &raw, target.uid())?;
        let target = target.to_string();
        if !options.dry_run {
            store.set(&target, &value)?;
        }
        tracing::debug!(from = %key, to = %target, "migrated to global namespace");
        report.record(&key, target);
    }

    Ok(report)
}

/// Copy every key outside `item:global:` to `item:g:default:<identifier>`.
///
/// The identifier is the key's last colon segment and the value is written
/// unchanged.
///
/// # Errors
///
/// Aborts on the first store failure; values written before the failure
/// stay written.
pub fn migrate_to_default_namespace(
    store: &mut impl KeyValueStore,
    options: MigrateOptions,
) -> Result<MigrationReport> {
    let mut report = MigrationReport::new(options);
    let keys = store.keys()?;
    report.scan(&keys);

    for key in keys {
        if key::is_legacy_global(&key) {
            report.skipped += 1;
            continue;
        }

        let target = ItemKey::default_namespace(key::identifier_suffix(&key)).to_string();
        let Some(raw) = store.get(&key)? else {
            tracing::warn!(key = %key, "key vanished before it could be read");
            report.missing += 1;
            continue;
        };

        if !options.dry_run {
            store.set(&target, &raw)?;
        }
        tracing::debug!(from = %key, to = %target, "migrated to default namespace");
        report.record(&key, target);
    }

    Ok(report)
}
