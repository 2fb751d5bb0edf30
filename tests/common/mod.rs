#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory with a scripted stand-in for `redis-cli`.
///
/// The script answers `KEYS *` with a fixed list, `GET` from a fixed table
/// of reply files, and appends every `SET`/`FLUSHDB` it receives to
/// `calls.log`. `SET` reads its value from stdin, as `redis-cli -x` does.
pub struct FakeRedis {
    pub dir: TempDir,
    pub script: PathBuf,
    pub log: PathBuf,
}

impl FakeRedis {
    /// `keys_json` is the literal `KEYS *` reply; `values` maps keys to the
    /// literal JSON reply for `GET`.
    pub fn new(keys_json: &str, values: &[(&str, &str)]) -> Self {
        let raw: Vec<(&str, &[u8])> = values.iter().map(|(k, v)| (*k, v.as_bytes())).collect();
        Self::with_raw_replies(keys_json, &raw)
    }

    /// Like [`FakeRedis::new`], but `GET` replies are raw bytes.
    pub fn with_raw_replies(keys_json: &str, values: &[(&str, &[u8])]) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let log = dir.path().join("calls.log");
        let script = dir.path().join("redis-cli");

        let mut get_cases = String::new();
        for (idx, (key, reply)) in values.iter().enumerate() {
            let reply_path = dir.path().join(format!("get-{idx}.reply"));
            let mut bytes = reply.to_vec();
            bytes.push(b'\n');
            fs::write(&reply_path, bytes).expect("write reply");
            get_cases.push_str(&format!(
                "    '{key}') cat '{}' ;;\n",
                reply_path.display()
            ));
        }

        let body = format!(
            "#!/bin/sh\n\
             # -h HOST -p PORT -c --json [-x]\n\
             shift 6\n\
             if [ \"$1\" = \"-x\" ]; then shift; stdin_value=$(cat); fi\n\
             case \"$1\" in\n\
             KEYS) printf '%s\\n' '{keys_json}' ;;\n\
             GET)\n  case \"$2\" in\n{get_cases}    *) echo null ;;\n  esac ;;\n\
             SET) printf 'SET %s %s\\n' \"$2\" \"$stdin_value\" >> '{log}'; echo '\"OK\"' ;;\n\
             FLUSHDB) echo FLUSHDB >> '{log}'; echo '\"OK\"' ;;\n\
             *) echo \"ERR unknown command '$1'\"; exit 1 ;;\n\
             esac\n",
            log = log.display()
        );
        write_executable(&script, &body);

        Self { dir, script, log }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn ksm(&self) -> Command {
        let mut cmd = Command::cargo_bin("ksm").expect("ksm binary");
        cmd.current_dir(self.root())
            .env("REDIS_CLI", &self.script)
            .env_remove("REDIS_PORT")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[cfg(unix)]
fn write_executable(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, body).expect("write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod script");
}

#[cfg(not(unix))]
fn write_executable(path: &Path, body: &str) {
    fs::write(path, body).expect("write script");
}
