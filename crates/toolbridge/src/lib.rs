pub mod audit;
pub mod config;
pub mod error;
pub mod registry;
pub mod runner;
pub mod server;

pub use crate::audit::{AuditSink, FsAuditSink};
pub use crate::config::Config;
pub use crate::error::{BridgeError, BridgeResult, ErrorCode, ErrorPayload};
pub use crate::registry::{Registry, ToolSpec};
pub use crate::runner::{ExecPolicy, RunOutcome, RunRequest, RunResult};
pub use crate::server::Server;
