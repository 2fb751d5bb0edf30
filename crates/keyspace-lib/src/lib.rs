//! `keyspace-lib` — key model, store client and migration passes.
//!
//! Everything here works against the [`KeyValueStore`] trait, so the same
//! passes run against a live server through `redis-cli` or against an
//! [`InMemoryStore`].
//!
//! # Quick Start
//!
//! ```no_run
//! use keyspace_lib::{MigrateOptions, RedisCli, StoreConfig, migrate, snapshot};
//! use std::path::Path;
//!
//! let mut store = RedisCli::new(StoreConfig::default());
//!
//! // Copy legacy items under item:global:<uuid>
//! let report = migrate::migrate_to_global(&mut store, MigrateOptions::default()).unwrap();
//! println!("{} keys migrated", report.written);
//!
//! // Back up everything
//! let (records, _) = snapshot::export(&mut store).unwrap();
//! snapshot::save(Path::new("items.json"), &records).unwrap();
//! ```

pub mod error;
pub mod key;
pub mod migrate;
pub mod redis_cli;
pub mod snapshot;
pub mod store;

pub use error::{KeyspaceError, Result};
pub use key::{ItemKey, KeyTier};
pub use migrate::{MigrateOptions, MigrationReport};
pub use redis_cli::{RedisCli, StoreConfig};
pub use snapshot::{BackupRecord, ImportOptions};
pub use store::{InMemoryStore, KeyValueStore};
