//! Per-domain `ctltrigger` invocation.
//!
//! The trigger tool separates "could not run the trigger" (nonzero exit) from
//! "ran the trigger, which failed" (exit 0 with a nonzero code on stdout).
use super::{run_tool, InvocationOutcome};
use crate::cli::DomainId;
use crate::error::Result;
use crate::tools::ResolvedTool;

pub const REMOUNT_ACTION: &str = "remount";
/// Per-domain result when the trigger could not be attempted.
pub const TRIGGER_FAILED: i64 = 1;

pub fn build_trigger_args(domain: DomainId, scope: &str, action: &str) -> Vec<String> {
    vec![domain.to_string(), scope.to_string(), action.to_string()]
}

/// Ask `domain` to remount `scope`. Errors only when the tool cannot be spawned.
pub fn trigger_remount(
    tool: &ResolvedTool,
    domain: DomainId,
    scope: &str,
) -> Result<InvocationOutcome> {
    let args = build_trigger_args(domain, scope, REMOUNT_ACTION);
    let output = run_tool(tool, &args, true)?;
    Ok(interpret_trigger_output(output.status.code(), &output.stdout))
}

/// Stdout is only read when the process exited 0.
pub fn interpret_trigger_output(code: Option<i32>, stdout: &[u8]) -> InvocationOutcome {
    let mut outcome = InvocationOutcome::from_exit_code(code);
    if !outcome.succeeded() {
        return outcome;
    }
    outcome.reported = parse_reported(stdout);
    if outcome.reported.is_none() {
        tracing::warn!(
            stdout = %String::from_utf8_lossy(stdout),
            "trigger output is not an integer result code"
        );
    }
    outcome
}

/// Per-domain result code: 0 on success.
pub fn remount_result(outcome: &InvocationOutcome) -> i64 {
    if !outcome.succeeded() {
        return TRIGGER_FAILED;
    }
    outcome.reported.unwrap_or(TRIGGER_FAILED)
}

fn parse_reported(stdout: &[u8]) -> Option<i64> {
    std::str::from_utf8(stdout).ok()?.trim().parse().ok()
}
