//! Output formatting for `keyspace_migrate`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//! JSON output wraps each pass report in a [`CommandReport`] so scripts can
//! tell which subcommand produced it.

mod output;
mod text;

pub use output::{CommandReport, OutputContext};
pub use text::{
    format_export_report, format_import_report, format_migration_report, format_move_line,
};
