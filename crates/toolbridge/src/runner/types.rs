//! Run request and result modeling.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ErrorCode, ErrorPayload};
use crate::runner::contract::ContractError;

/// A single tool invocation request.
///
/// `env` and `client` are passthrough metadata: the pipeline never consumes
/// them, but the audit trail preserves them with the rest of the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRequest {
    /// `"json"` activates the stdout contract for JSON-mode tools.
    #[serde(default)]
    pub mode: String,
    /// Requested working directory; must resolve inside an allowlisted root.
    #[serde(default)]
    pub cwd: String,
    /// Tool arguments, expanded through the spec's argument mappings.
    #[serde(default)]
    pub args: Map<String, Value>,
    #[serde(default)]
    pub env: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub client: Value,
}

impl RunRequest {
    pub fn json_mode(&self) -> bool {
        self.mode == "json"
    }
}

/// Terminal outcome of one run.
///
/// A tagged variant per terminal state keeps invalid combinations, such as
/// success with an error attached, unrepresentable.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Process exited zero; the contract (when active) held.
    Success {
        stdout: String,
        stderr: String,
        stdout_json: Option<Value>,
    },
    /// The requested cwd is outside every allowlisted root. No process was
    /// spawned.
    Rejected,
    /// Spawn failed, the synthesized argv was empty, or the process exited
    /// nonzero. Spawn-level failures carry the fixed exit code 70 with no
    /// captured output; a completed nonzero process carries its own exit
    /// code and output.
    ExecFailed {
        exit_code: i32,
        message: String,
        stdout: String,
        stderr: String,
    },
    /// Deadline expired; the process was terminated and partial output
    /// discarded.
    TimedOut,
    /// JSON-mode stdout contract violated; the process exit code is
    /// discarded.
    ContractViolation { reason: ContractError },
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Success { .. } => 0,
            RunOutcome::Rejected => 40,
            RunOutcome::ExecFailed { exit_code, .. } => *exit_code,
            RunOutcome::TimedOut => 124,
            RunOutcome::ContractViolation { .. } => 40,
        }
    }

    /// Convert into the wire/audit form.
    pub fn into_result(self) -> RunResult {
        match self {
            RunOutcome::Success {
                stdout,
                stderr,
                stdout_json,
            } => RunResult {
                ok: true,
                exit_code: 0,
                error: None,
                stdout,
                stderr,
                stdout_json,
            },
            RunOutcome::Rejected => RunResult::failure(
                40,
                ErrorCode::CwdNotAllowlisted,
                "cwd is not in allowlisted roots",
            ),
            RunOutcome::ExecFailed {
                exit_code,
                message,
                stdout,
                stderr,
            } => RunResult {
                ok: false,
                exit_code,
                error: Some(ErrorPayload::new(ErrorCode::ExecFailed, message)),
                stdout,
                stderr,
                stdout_json: None,
            },
            RunOutcome::TimedOut => {
                RunResult::failure(124, ErrorCode::Timeout, "command timed out")
            }
            RunOutcome::ContractViolation { .. } => RunResult::failure(
                40,
                ErrorCode::StdoutNotJson,
                "stdout is not exactly one JSON object",
            ),
        }
    }
}

/// Serialized form of a run outcome, as returned to the caller and written
/// to the audit trail. Only produced through [`RunOutcome::into_result`].
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub ok: bool,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout_json: Option<Value>,
}

impl RunResult {
    fn failure(exit_code: i32, code: ErrorCode, message: &str) -> Self {
        Self {
            ok: false,
            exit_code,
            error: Some(ErrorPayload::new(code, message)),
            stdout: String::new(),
            stderr: String::new(),
            stdout_json: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_defaults_tolerate_sparse_bodies() {
        let request: RunRequest = serde_json::from_str(r#"{"cwd":"/tmp"}"#).expect("parse");
        assert_eq!(request.cwd, "/tmp");
        assert_eq!(request.mode, "");
        assert!(request.args.is_empty());
        assert!(!request.json_mode());
    }

    #[test]
    fn request_preserves_passthrough_metadata() {
        let body = r#"{
            "mode": "json",
            "cwd": "/tmp",
            "args": {"verbose": true},
            "env": {"K": "v"},
            "client": {"name": "test"}
        }"#;
        let request: RunRequest = serde_json::from_str(body).expect("parse");
        assert!(request.json_mode());
        assert_eq!(request.env["K"], "v");
        assert_eq!(request.client["name"], "test");

        let round = serde_json::to_value(&request).expect("serialize");
        assert_eq!(round["env"]["K"], "v");
        assert_eq!(round["client"]["name"], "test");
    }

    #[test]
    fn success_result_has_no_error() {
        let outcome = RunOutcome::Success {
            stdout: "out".to_string(),
            stderr: String::new(),
            stdout_json: Some(json!({"ok": true})),
        };
        assert_eq!(outcome.exit_code(), 0);
        let result = outcome.into_result();
        assert!(result.ok);
        assert!(result.error.is_none());
        assert_eq!(result.stdout, "out");
    }

    #[test]
    fn rejected_maps_to_cwd_code_and_exit_40() {
        let result = RunOutcome::Rejected.into_result();
        assert!(!result.ok);
        assert_eq!(result.exit_code, 40);
        assert_eq!(
            result.error.expect("error").code,
            ErrorCode::CwdNotAllowlisted
        );
    }

    #[test]
    fn timeout_maps_to_exit_124() {
        let result = RunOutcome::TimedOut.into_result();
        assert_eq!(result.exit_code, 124);
        assert_eq!(result.error.expect("error").code, ErrorCode::Timeout);
        assert!(result.stdout.is_empty());
    }

    #[test]
    fn exec_failed_keeps_process_exit_and_output() {
        let outcome = RunOutcome::ExecFailed {
            exit_code: 3,
            message: "command failed".to_string(),
            stdout: "partial".to_string(),
            stderr: "boom".to_string(),
        };
        let result = outcome.into_result();
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stdout, "partial");
        assert_eq!(result.stderr, "boom");
        assert_eq!(result.error.expect("error").code, ErrorCode::ExecFailed);
    }

    #[test]
    fn contract_violation_maps_to_exit_40() {
        let outcome = RunOutcome::ContractViolation {
            reason: ContractError::MultipleValues,
        };
        let result = outcome.into_result();
        assert_eq!(result.exit_code, 40);
        assert_eq!(result.error.expect("error").code, ErrorCode::StdoutNotJson);
        assert!(result.stdout_json.is_none());
    }

    #[test]
    fn empty_output_fields_are_omitted_from_wire_form() {
        let value = serde_json::to_value(RunOutcome::TimedOut.into_result()).expect("serialize");
        let object = value.as_object().expect("object");
        assert!(!object.contains_key("stdout"));
        assert!(!object.contains_key("stderr"));
        assert!(!object.contains_key("stdout_json"));
        assert_eq!(value["exit_code"], 124);
    }
}
