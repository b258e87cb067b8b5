//! Sandboxed tool execution pipeline.
//!
//! One run flows `allowlist check → argv synthesis → spawn → wait under
//! deadline → contract check`, producing a [`RunOutcome`]. The pipeline is
//! stateless: concurrent runs share nothing beyond the immutable policy.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;

use crate::config::Config;
use crate::registry::ToolSpec;

pub mod argv;
pub mod contract;
pub mod sandbox;
pub mod types;

pub use self::types::{RunOutcome, RunRequest, RunResult};

/// The sandbox boundary applied to every run, derived from [`Config`] at
/// startup and read-only thereafter.
#[derive(Debug, Clone)]
pub struct ExecPolicy {
    pub allowlisted_roots: Vec<PathBuf>,
    pub env_allowlist: Vec<String>,
    pub max_runtime_ms: u64,
}

impl ExecPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allowlisted_roots: config.allowlisted_roots.iter().map(PathBuf::from).collect(),
            env_allowlist: config.env_allowlist.clone(),
            max_runtime_ms: config.max_runtime_ms,
        }
    }
}

/// Run one tool invocation through the full pipeline.
///
/// The child is spawned with `kill_on_drop`, so every exit path out of this
/// function (completion, deadline expiry, cancellation) terminates it; no
/// process outlives the call.
pub async fn run(spec: &ToolSpec, request: &RunRequest, policy: &ExecPolicy) -> RunOutcome {
    if !sandbox::is_within_roots(Path::new(&request.cwd), &policy.allowlisted_roots) {
        tracing::debug!(tool = %spec.name, cwd = %request.cwd, "run rejected by allowlist");
        return RunOutcome::Rejected;
    }

    let argv = argv::build_argv(&spec.exec, &request.args);
    let Some((program, rest)) = argv.split_first() else {
        return RunOutcome::ExecFailed {
            exit_code: 70,
            message: "empty argv".to_string(),
            stdout: String::new(),
            stderr: String::new(),
        };
    };

    let mut command = Command::new(program);
    command
        .args(rest)
        .current_dir(&request.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command.env_clear();
    for (key, value) in sandbox::filtered_env(&policy.env_allowlist) {
        command.env(key, value);
    }

    let child = match command.spawn() {
        Ok(child) => child,
        Err(error) => {
            tracing::debug!(tool = %spec.name, program = %program, %error, "spawn failed");
            return RunOutcome::ExecFailed {
                exit_code: 70,
                message: "tool execution failed".to_string(),
                stdout: String::new(),
                stderr: String::new(),
            };
        }
    };

    let deadline = Duration::from_millis(policy.max_runtime_ms);
    let output = match tokio::time::timeout(deadline, child.wait_with_output()).await {
        // Dropping the wait future drops the child handle; kill_on_drop
        // terminates the process before we return.
        Err(_elapsed) => {
            tracing::debug!(tool = %spec.name, timeout_ms = policy.max_runtime_ms, "run timed out");
            return RunOutcome::TimedOut;
        }
        Ok(Err(error)) => {
            tracing::debug!(tool = %spec.name, %error, "failed to collect child output");
            return RunOutcome::ExecFailed {
                exit_code: 70,
                message: "tool execution failed".to_string(),
                stdout: String::new(),
                stderr: String::new(),
            };
        }
        Ok(Ok(output)) => output,
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        return RunOutcome::ExecFailed {
            exit_code: output.status.code().unwrap_or(-1),
            message: "command failed".to_string(),
            stdout,
            stderr,
        };
    }

    let stdout_json = if spec.json_mode && request.json_mode() {
        match contract::parse_single_object(&stdout) {
            Ok(object) => Some(Value::Object(object)),
            Err(reason) => {
                tracing::debug!(tool = %spec.name, %reason, "stdout contract violated");
                return RunOutcome::ContractViolation { reason };
            }
        }
    } else {
        None
    };

    RunOutcome::Success {
        stdout,
        stderr,
        stdout_json,
    }
}
