//! Subprocess invocation of the external tools.
//!
//! Every invocation gets an empty stdin and blocks until the child exits.
//! There is no timeout: a hung tool hangs the run.
use crate::error::{AddFileError, Result};
use crate::tools::ResolvedTool;
use crate::util::display_argv;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Instant;

mod trigger;
mod volume;

pub use trigger::{remount_result, trigger_remount, REMOUNT_ACTION, TRIGGER_FAILED};
pub use volume::update_volume;

/// Exit code recorded for a child that was killed by a signal.
pub const SIGNALLED_EXIT_CODE: i32 = -1;

/// Result of one external process invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationOutcome {
    pub exit_code: i32,
    /// Value the tool printed on stdout; trigger tool only, and only on exit 0.
    pub reported: Option<i64>,
}

impl InvocationOutcome {
    pub fn from_exit_code(code: Option<i32>) -> Self {
        Self {
            exit_code: code.unwrap_or(SIGNALLED_EXIT_CODE),
            reported: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

pub(crate) struct ToolOutput {
    pub(crate) status: ExitStatus,
    pub(crate) stdout: Vec<u8>,
}

/// Spawn `tool` with `args` and wait for it.
///
/// stderr is always inherited; stdout is captured only when asked for.
/// A spawn failure is an error; a nonzero exit is not.
pub(crate) fn run_tool(
    tool: &ResolvedTool,
    args: &[String],
    capture_stdout: bool,
) -> Result<ToolOutput> {
    let program = tool.program();
    tracing::debug!(tool = %tool.name, argv = %display_argv(&program, args), "invoke tool");

    let stdout = if capture_stdout {
        Stdio::piped()
    } else {
        Stdio::inherit()
    };
    let start = Instant::now();
    let output = Command::new(&tool.path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(Stdio::inherit())
        .output()
        .map_err(|io| AddFileError::Spawn {
            program: program.clone(),
            io,
        })?;
    let elapsed_ms = start.elapsed().as_millis();

    tracing::info!(
        tool = %tool.name,
        elapsed_ms,
        exit_code = ?output.status.code(),
        stdout_bytes = output.stdout.len(),
        "tool invocation complete"
    );

    Ok(ToolOutput {
        status: output.status,
        stdout: output.stdout,
    })
}
