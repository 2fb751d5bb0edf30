//! Store access through the `redis-cli` command-line client.
//!
//! Every operation spawns one client process and waits for it. The client
//! runs with `--json`, so each reply is a single JSON document: `KEYS`
//! answers with an array, `GET` with a string or `null`. Values containing
//! newlines therefore come back whole. `SET` sends its value on stdin
//! (`-x`), so value size is not bounded by the argument-length limit.
//! Output must be valid UTF-8; anything else aborts the run.

use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

use crate::error::{KeyspaceError, Result};
use crate::store::KeyValueStore;

/// Port `redis-cli` connects to when none is configured.
pub const DEFAULT_PORT: u16 = 6379;

/// Host `redis-cli` connects to when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Client binary looked up on `PATH` when none is configured.
pub const DEFAULT_PROGRAM: &str = "redis-cli";

/// Connection settings handed to every client invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Client binary to execute.
    pub program: String,
    pub host: String,
    pub port: u16,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// [`KeyValueStore`] backed by `redis-cli` subprocesses.
#[derive(Debug, Clone)]
pub struct RedisCli {
    config: StoreConfig,
}

impl RedisCli {
    #[must_use]
    pub const fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Full argument list for one command, connection flags first.
    ///
    /// With `value_on_stdin` the client is told (`-x`) to read the final
    /// argument from stdin, which keeps large values off the command line.
    #[must_use]
    pub fn command_args(&self, command: &[&str], value_on_stdin: bool) -> Vec<String> {
        let mut args = vec![
            "-h".to_string(),
            self.config.host.clone(),
            "-p".to_string(),
            self.config.port.to_string(),
            "-c".to_string(),
            "--json".to_string(),
        ];
        if value_on_stdin {
            args.push("-x".to_string());
        }
        args.extend(command.iter().map(|part| (*part).to_string()));
        args
    }

    fn run(&self, command: &[&str], stdin: Option<&str>) -> Result<Value> {
        let label = command_label(command);
        tracing::trace!(command = %label, "invoking {}", self.config.program);

        let spawn_error = |source: std::io::Error| KeyspaceError::ClientSpawn {
            program: self.config.program.clone(),
            source,
        };

        let mut child = Command::new(&self.config.program)
            .args(self.command_args(command, stdin.is_some()))
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let (Some(value), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(value.as_bytes())
                .map_err(|e| KeyspaceError::ClientFailed {
                    command: label.clone(),
                    message: format!("could not send value: {e}"),
                })?;
        }

        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(KeyspaceError::ClientFailed {
                command: label,
                message: format!("{} ({message})", output.status),
            });
        }

        let stdout = decode_stdout(&label, output.stdout)?;
        parse_reply(&label, &stdout)
    }
}

impl KeyValueStore for RedisCli {
    fn keys(&mut self) -> Result<Vec<String>> {
        let reply = self.run(&["KEYS", "*"], None)?;
        parse_key_list("KEYS *", reply)
    }

    fn get(&mut self, key: &str) -> Result<Option<String>> {
        let reply = self.run(&["GET", key], None)?;
        parse_bulk_string(&format!("GET {key}"), reply)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let reply = self.run(&["SET", key], Some(value))?;
        expect_ok(&format!("SET {key}"), &reply)
    }

    fn flush(&mut self) -> Result<()> {
        let reply = self.run(&["FLUSHDB"], None)?;
        expect_ok("FLUSHDB", &reply)
    }
}

/// Decode client output strictly as UTF-8.
///
/// # Errors
///
/// Returns `ClientReply` if the output is not valid UTF-8.
pub fn decode_stdout(command: &str, stdout: Vec<u8>) -> Result<String> {
    String::from_utf8(stdout).map_err(|e| KeyspaceError::ClientReply {
        command: command.to_string(),
        reply: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })
}

fn command_label(command: &[&str]) -> String {
    // Values can be large; only the verb and key go into messages.
    command.iter().take(2).copied().collect::<Vec<_>>().join(" ")
}

/// Decode one `--json` reply, turning error replies into `ClientFailed`.
///
/// # Errors
///
/// Returns `ClientFailed` for an error reply and `ClientReply` for
/// anything that is not a JSON document.
pub fn parse_reply(command: &str, stdout: &str) -> Result<Value> {
    let trimmed = stdout.trim();
    if let Some(message) = error_reply(trimmed) {
        return Err(KeyspaceError::ClientFailed {
            command: command.to_string(),
            message: message.to_string(),
        });
    }
    serde_json::from_str(trimmed).map_err(|_| KeyspaceError::ClientReply {
        command: command.to_string(),
        reply: trimmed.to_string(),
    })
}

fn error_reply(text: &str) -> Option<&str> {
    if let Some(message) = text.strip_prefix("(error)") {
        return Some(message.trim());
    }
    ["ERR ", "WRONGTYPE ", "NOAUTH ", "MOVED ", "CLUSTERDOWN "]
        .iter()
        .any(|prefix| text.starts_with(prefix))
        .then_some(text)
}

/// Interpret a reply as a list of keys.
///
/// # Errors
///
/// Returns `ClientReply` unless the reply is an array of strings.
pub fn parse_key_list(command: &str, reply: Value) -> Result<Vec<String>> {
    let unexpected = |reply: &Value| KeyspaceError::ClientReply {
        command: command.to_string(),
        reply: reply.to_string(),
    };
    match reply {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(key) => Ok(key),
                other => Err(unexpected(&other)),
            })
            .collect(),
        other => Err(unexpected(&other)),
    }
}

/// Interpret a reply as an optional string value.
///
/// # Errors
///
/// Returns `ClientReply` unless the reply is a string or `null`.
pub fn parse_bulk_string(command: &str, reply: Value) -> Result<Option<String>> {
    match reply {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value)),
        other => Err(KeyspaceError::ClientReply {
            command: command.to_string(),
            reply: other.to_string(),
        }),
    }
}

fn expect_ok(command: &str, reply: &Value) -> Result<()> {
    match reply {
        Value::String(status) if status == "OK" => Ok(()),
        other => Err(KeyspaceError::ClientReply {
            command: command.to_string(),
            reply: other.to_string(),
        }),
    }
}
