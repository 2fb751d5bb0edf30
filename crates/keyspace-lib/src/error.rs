//! Error types for `keyspace-lib`.
//!
//! Every variant is fatal to the run that raised it; nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for keyspace operations.
#[derive(Error, Debug)]
pub enum KeyspaceError {
    // === Value Errors ===
    /// A stored value could not be decoded as a JSON object.
    #[error("Value under '{key}' is not a JSON object: {reason}")]
    ValueDecode { key: String, reason: String },

    /// A stored value lacks a field the migration needs.
    #[error("Value under '{key}' has no '{field}' field")]
    MissingField { key: String, field: String },

    // === Store Client Errors ===
    /// The store client binary could not be started.
    #[error("Failed to start '{program}': {source}")]
    ClientSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The store client exited nonzero or answered with an error reply.
    #[error("'{command}' failed: {message}")]
    ClientFailed { command: String, message: String },

    /// The store client printed something that is not the expected reply.
    #[error("Unexpected reply to '{command}': {reply}")]
    ClientReply { command: String, reply: String },

    // === Snapshot Errors ===
    /// The snapshot file is not a JSON array of key/value records.
    #[error("Snapshot parse error in {path}: {reason}")]
    SnapshotParse { path: PathBuf, reason: String },

    /// File not found at the specified path.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KeyspaceError {
    #[must_use]
    pub fn value_decode(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValueDecode {
            key: key.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn missing_field(key: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            key: key.into(),
            field: field.into(),
        }
    }
}

/// Result type using `KeyspaceError`.
pub type Result<T> = std::result::Result<T, KeyspaceError>;
