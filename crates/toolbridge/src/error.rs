use std::fmt;

use serde::Serialize;

/// Stable machine-readable error codes reported on the wire and in audit
/// records. Callers branch on these rather than parsing message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "ERR_CONFIG_INVALID")]
    ConfigInvalid,
    #[serde(rename = "ERR_REGISTRY_INVALID")]
    RegistryInvalid,
    #[serde(rename = "ERR_TOOL_NOT_FOUND")]
    ToolNotFound,
    #[serde(rename = "ERR_NOT_FOUND")]
    NotFound,
    #[serde(rename = "ERR_INVALID_INPUT")]
    InvalidInput,
    #[serde(rename = "ERR_CWD_NOT_ALLOWLISTED")]
    CwdNotAllowlisted,
    #[serde(rename = "ERR_EXEC_FAILED")]
    ExecFailed,
    #[serde(rename = "ERR_TIMEOUT")]
    Timeout,
    #[serde(rename = "ERR_STDOUT_NOT_JSON")]
    StdoutNotJson,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalid => "ERR_CONFIG_INVALID",
            ErrorCode::RegistryInvalid => "ERR_REGISTRY_INVALID",
            ErrorCode::ToolNotFound => "ERR_TOOL_NOT_FOUND",
            ErrorCode::NotFound => "ERR_NOT_FOUND",
            ErrorCode::InvalidInput => "ERR_INVALID_INPUT",
            ErrorCode::CwdNotAllowlisted => "ERR_CWD_NOT_ALLOWLISTED",
            ErrorCode::ExecFailed => "ERR_EXEC_FAILED",
            ErrorCode::Timeout => "ERR_TIMEOUT",
            ErrorCode::StdoutNotJson => "ERR_STDOUT_NOT_JSON",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error attached to failed runs and API error envelopes.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Unified error type for bridge startup: configuration and registry
/// loading. Run-level failures are modeled separately as [`RunOutcome`]
/// variants, not as errors.
///
/// [`RunOutcome`]: crate::runner::RunOutcome
#[derive(Debug, Clone)]
pub enum BridgeError {
    /// The configuration file exists but cannot be used.
    Config(String),
    /// A tool spec in the registry tree is malformed or incomplete.
    Registry(String),
    /// Internal error.
    Internal(String),
}

impl BridgeError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            BridgeError::Config(_) => Some(ErrorCode::ConfigInvalid),
            BridgeError::Registry(_) => Some(ErrorCode::RegistryInvalid),
            BridgeError::Internal(_) => None,
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Config(msg) => write!(f, "ERR_CONFIG_INVALID: {msg}"),
            BridgeError::Registry(msg) => write!(f, "ERR_REGISTRY_INVALID: {msg}"),
            BridgeError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Result type alias using [`BridgeError`].
pub type BridgeResult<T> = Result<T, BridgeError>;
