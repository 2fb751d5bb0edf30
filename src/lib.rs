//! `keyspace_migrate` (ksm) - keyspace migrations, backup and restore.
//!
//! This crate provides the `ksm` CLI on top of `keyspace-lib`.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Connection and history settings
//! - [`format`] - Output formatting (text, JSON)
//! - [`logging`] - tracing subscriber setup
//! - [`sync`] - Snapshot history
//!
//! Store access, key layout and the passes themselves live in
//! `keyspace_lib`.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod format;
pub mod logging;
pub mod sync;

pub use keyspace_lib::{KeyspaceError, Result};

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if command execution fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
