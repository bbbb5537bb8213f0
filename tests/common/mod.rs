//! Shared test infrastructure for integration tests.
//!
//! A [`TestFixture`] owns a temp directory holding fake `shfs_admin` and
//! `ctltrigger` scripts. The scripts record how they were called so tests can
//! assert on argv, stdin and call counts after running the real binary.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const ADMIN_SCRIPT: &str = r#"dir=$(dirname "$0")
printf '%s\n' "$@" > "$dir/admin.argv"
cat > "$dir/admin.stdin"
echo call >> "$dir/admin.calls"
if [ -f "$dir/admin.exit" ]; then exit "$(cat "$dir/admin.exit")"; fi
exit 0"#;

const TRIGGER_SCRIPT: &str = r#"dir=$(dirname "$0")
echo "$*" >> "$dir/trigger.calls"
cat > /dev/null
if [ -f "$dir/exit.$1" ]; then exit "$(cat "$dir/exit.$1")"; fi
if [ -f "$dir/reply.$1" ]; then cat "$dir/reply.$1"; else echo 0; fi"#;

/// Output of one run of the binary, decoded for assertions.
#[derive(Debug)]
pub struct RunResult {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for RunResult {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

pub struct TestFixture {
    temp: TempDir,
    tools_dir: PathBuf,
}

impl TestFixture {
    /// Fixture with both fake tools installed.
    pub fn new() -> anyhow::Result<Self> {
        let temp = TempDir::new()?;
        let tools_dir = temp.path().join("tools");
        fs::create_dir_all(&tools_dir)?;
        let fixture = Self { temp, tools_dir };
        fixture.install("shfs_admin", ADMIN_SCRIPT)?;
        fixture.install("ctltrigger", TRIGGER_SCRIPT)?;
        Ok(fixture)
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn tool_path(&self, name: &str) -> PathBuf {
        self.tools_dir.join(name)
    }

    pub fn install(&self, name: &str, body: &str) -> anyhow::Result<()> {
        let path = self.tool_path(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(())
    }

    /// Make the fake trigger print `reply` for `domain`.
    pub fn set_reply(&self, domain: u32, reply: &str) -> anyhow::Result<()> {
        fs::write(self.tools_dir.join(format!("reply.{domain}")), reply)?;
        Ok(())
    }

    /// Make the fake trigger exit with `code` for `domain`.
    pub fn set_trigger_exit(&self, domain: u32, code: i32) -> anyhow::Result<()> {
        fs::write(self.tools_dir.join(format!("exit.{domain}")), code.to_string())?;
        Ok(())
    }

    pub fn set_admin_exit(&self, code: i32) -> anyhow::Result<()> {
        fs::write(self.tools_dir.join("admin.exit"), code.to_string())?;
        Ok(())
    }

    /// Tool configuration pointing both tools at the fixture scripts.
    pub fn tools_json(&self) -> String {
        serde_json::json!({
            "tools": {
                "shfs_admin": [self.tool_path("shfs_admin")],
                "ctltrigger": [self.tool_path("ctltrigger")],
            }
        })
        .to_string()
    }

    /// Run the binary with the fixture's tool configuration.
    pub fn run(&self, args: &[&str]) -> anyhow::Result<RunResult> {
        self.run_with_tools(args, &self.tools_json())
    }

    pub fn run_with_tools(&self, args: &[&str], tools_json: &str) -> anyhow::Result<RunResult> {
        let output = Command::new(env!("CARGO_BIN_EXE_shfs-add-file"))
            .args(args)
            .current_dir(self.root())
            .env("SHFS_ADD_FILE_TOOLS", tools_json)
            .env_remove("SHFS_ADD_FILE_LOG")
            .env_remove("RUST_LOG")
            .output()?;
        Ok(output.into())
    }

    /// Arguments of the last `shfs_admin` call, one per line.
    pub fn admin_argv(&self) -> Vec<String> {
        read_lines(&self.tools_dir.join("admin.argv"))
    }

    pub fn admin_calls(&self) -> usize {
        read_lines(&self.tools_dir.join("admin.calls")).len()
    }

    pub fn admin_stdin(&self) -> Option<String> {
        fs::read_to_string(self.tools_dir.join("admin.stdin")).ok()
    }

    /// `DOMAIN SCOPE ACTION` for every trigger call, in call order.
    pub fn trigger_calls(&self) -> Vec<String> {
        read_lines(&self.tools_dir.join("trigger.calls"))
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
