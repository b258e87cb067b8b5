//! Durable per-run audit records.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{BridgeError, BridgeResult};
use crate::registry::ToolSpec;
use crate::runner::RunRequest;

/// Location of one run's record set.
#[derive(Debug, Clone)]
pub struct RunHandle {
    pub run_id: String,
    pub dir: PathBuf,
}

/// Everything persisted for one run: the original request, the resolved
/// spec, the parsed stdout object when one exists, raw stderr, and the
/// final response body.
pub struct RunRecord<'a> {
    pub request: &'a RunRequest,
    pub resolved: &'a ToolSpec,
    pub stdout_json: Option<&'a Value>,
    pub stderr: &'a str,
    pub result: &'a Value,
}

/// Per-run audit record store. Writes are best-effort: callers log
/// failures and never surface them to the requester.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Allocate a run id and its record location.
    async fn begin_run(&self) -> BridgeResult<RunHandle>;
    /// Persist one record set under a previously allocated handle.
    async fn record(&self, handle: &RunHandle, record: RunRecord<'_>) -> BridgeResult<()>;
}

/// Filesystem audit sink: one directory per run, nested year/month/day,
/// keyed by UTC timestamp plus a random suffix.
pub struct FsAuditSink {
    runs_dir: PathBuf,
}

impl FsAuditSink {
    pub fn new(runs_dir: impl Into<PathBuf>) -> Self {
        Self {
            runs_dir: runs_dir.into(),
        }
    }
}

#[async_trait]
impl AuditSink for FsAuditSink {
    async fn begin_run(&self) -> BridgeResult<RunHandle> {
        let now = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let run_id = format!("{}Z-{}", now.format("%Y%m%dT%H%M%S%.3f"), &suffix[..8]);
        let dir = self
            .runs_dir
            .join(now.format("%Y").to_string())
            .join(now.format("%m").to_string())
            .join(now.format("%d").to_string())
            .join(&run_id);
        tokio::fs::create_dir_all(&dir).await.map_err(|error| {
            BridgeError::Internal(format!(
                "failed to create run dir {}: {error}",
                dir.display()
            ))
        })?;
        Ok(RunHandle { run_id, dir })
    }

    async fn record(&self, handle: &RunHandle, record: RunRecord<'_>) -> BridgeResult<()> {
        write_json(&handle.dir.join("request.json"), record.request).await?;
        write_json(&handle.dir.join("resolved.json"), record.resolved).await?;
        if let Some(stdout_json) = record.stdout_json {
            write_json(&handle.dir.join("stdout.json"), stdout_json).await?;
        }
        let stderr_path = handle.dir.join("stderr.txt");
        tokio::fs::write(&stderr_path, record.stderr)
            .await
            .map_err(|error| {
                BridgeError::Internal(format!(
                    "failed to write {}: {error}",
                    stderr_path.display()
                ))
            })?;
        write_json(&handle.dir.join("result.json"), record.result).await?;
        Ok(())
    }
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> BridgeResult<()> {
    let data = serde_json::to_vec_pretty(value).map_err(|error| {
        BridgeError::Internal(format!("failed to serialize {}: {error}", path.display()))
    })?;
    tokio::fs::write(path, data).await.map_err(|error| {
        BridgeError::Internal(format!("failed to write {}: {error}", path.display()))
    })
}
