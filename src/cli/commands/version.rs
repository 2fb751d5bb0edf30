//! Version command implementation.

use crate::format::OutputContext;
use keyspace_lib::Result;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(ctx: &OutputContext) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    if ctx.is_json() {
        ctx.json(&VersionOutput { version, build })?;
    } else {
        ctx.text(&format!("ksm {version} ({build})"));
    }
    Ok(())
}
