use serde::Serialize;

/// Where command results go.
///
/// Results are written to stdout, as text or as a single JSON document.
/// Diagnostics never go through here; they are logged to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputContext {
    json: bool,
    quiet: bool,
}

impl OutputContext {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.json
    }

    /// Print a value as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn json<T: Serialize>(&self, value: &T) -> serde_json::Result<()> {
        let text = serde_json::to_string_pretty(value)?;
        println!("{text}");
        Ok(())
    }

    /// Print text unless quiet.
    pub fn text(&self, text: &str) {
        if !self.quiet {
            println!("{text}");
        }
    }
}

/// JSON envelope naming the command that produced a report.
#[derive(Debug, Serialize)]
pub struct CommandReport<'a, T: Serialize> {
    pub command: &'a str,
    #[serde(flatten)]
    pub report: &'a T,
}
