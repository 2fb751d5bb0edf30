//! Snapshot file handling for `keyspace_migrate`.
//!
//! The export/import passes live in `keyspace_lib::snapshot`; this module
//! keeps previous snapshots around before `backup` overwrites them.

pub mod history;

pub use history::{HistoryConfig, preserve_before_export};
