//! Key-value store access.
//!
//! [`KeyValueStore`] is the seam between the migrations and the store.
//! [`RedisCli`](crate::redis_cli::RedisCli) drives a real server; the
//! [`InMemoryStore`] backs tests and dry runs.

use std::collections::BTreeMap;

use crate::error::Result;

/// The store operations a keyspace pass needs.
///
/// Every call is a single round-trip; implementations never batch.
pub trait KeyValueStore {
    /// List every key in the current database.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn keys(&mut self) -> Result<Vec<String>>;

    /// Read the value stored under `key`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn get(&mut self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove every key from the current database.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn flush(&mut self) -> Result<()>;
}

/// In-memory store backed by a `BTreeMap`.
///
/// Keys list in sorted order, which keeps passes over it deterministic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl InMemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls served so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the value under `key` without counting as a store call.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Snapshot of all entries in key order.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl<K, V> FromIterator<(K, V)> for InMemoryStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            writes: 0,
        }
    }
}

impl KeyValueStore for InMemoryStore {
    fn keys(&mut self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn get(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.writes += 1;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
