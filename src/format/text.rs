//! Text formatting functions for `keyspace_migrate`.
//!
//! Plain text (non-ANSI) summaries of each pass, one line per fact.

use keyspace_lib::MigrationReport;
use keyspace_lib::snapshot::{ExportReport, ImportReport};
use std::fmt::Write as _;

/// Format a single `from -> to` line.
#[must_use]
pub fn format_move_line(from: &str, to: &str) -> String {
    format!("{from} -> {to}")
}

/// Summary of a migration pass, with every move listed.
#[must_use]
pub fn format_migration_report(name: &str, report: &MigrationReport) -> String {
    let mut out = String::new();
    for mv in &report.moves {
        let _ = writeln!(out, "{}", format_move_line(&mv.from, &mv.to));
    }

    if !report.tiers.is_empty() {
        let _ = writeln!(out, "{}", format_tier_line(report));
    }

    let verb = if report.dry_run {
        "would write"
    } else {
        "wrote"
    };
    let _ = write!(
        out,
        "{name}: scanned {} key(s), skipped {}, missing {}, {verb} {}",
        report.scanned, report.skipped, report.missing, report.written
    );
    out
}

/// Scanned keys per layout, e.g. `tiers: unversioned 2, user 1`.
#[must_use]
pub fn format_tier_line(report: &MigrationReport) -> String {
    let counts: Vec<String> = report
        .tiers
        .iter()
        .map(|(tier, count)| format!("{tier} {count}"))
        .collect();
    format!("tiers: {}", counts.join(", "))
}

#[must_use]
pub fn format_export_report(path: &str, report: &ExportReport) -> String {
    format!(
        "backup: scanned {} key(s), missing {}, exported {} record(s) to {path}",
        report.scanned, report.missing, report.exported
    )
}

#[must_use]
pub fn format_import_report(path: &str, report: &ImportReport) -> String {
    let cleared = if report.cleared {
        "flushed database, "
    } else {
        ""
    };
    format!(
        "restore: {cleared}wrote {} record(s) from {path}",
        report.written
    )
}
