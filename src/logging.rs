//! Logging setup for `keyspace_migrate`.
//!
//! Diagnostics go to stderr through `tracing-subscriber`, leaving stdout to
//! command results. `RUST_LOG` takes precedence over the verbosity flags.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Default filter for a verbosity level.
#[must_use]
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `filter` overrides both `RUST_LOG` and the verbosity flags when given.
///
/// # Errors
///
/// Returns an error if the filter does not parse or a subscriber is
/// already installed.
pub fn init_logging(
    verbose: u8,
    quiet: bool,
    filter: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_directive(verbose, quiet)))?,
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}
