//! Route handlers for the registry and run endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::audit::RunRecord;
use crate::runner::{self, RunRequest};
use crate::server::error::ApiError;
use crate::server::ServerState;

/// GET /v1/health
pub(crate) async fn health() -> Json<Value> {
    Json(json!({"ok": true, "exit_code": 0}))
}

/// GET /v1/tools
pub(crate) async fn list_tools(State(state): State<Arc<ServerState>>) -> Json<Value> {
    Json(json!({"tools": state.registry.names(), "exit_code": 0}))
}

/// GET /v1/tools/{name}
pub(crate) async fn get_tool(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let spec = state
        .registry
        .lookup(&name)
        .ok_or_else(ApiError::tool_not_found)?;
    Ok(Json(json!({"tool": spec, "exit_code": 0})))
}

/// POST /v1/tools/{name}/run
///
/// Looks up the tool, runs it through the sandboxed pipeline, writes the
/// audit record set, then answers. The audit write happens before the
/// response is sent and its failure is never surfaced.
pub(crate) async fn run_tool(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    body: String,
) -> Result<Response, ApiError> {
    let spec = state
        .registry
        .lookup(&name)
        .ok_or_else(ApiError::tool_not_found)?;
    let request: RunRequest = serde_json::from_str(&body)
        .map_err(|error| ApiError::invalid_input(format!("invalid run request: {error}")))?;

    let handle = match state.audit.begin_run().await {
        Ok(handle) => Some(handle),
        Err(error) => {
            tracing::warn!(%error, "failed to allocate audit run dir");
            None
        }
    };
    let run_id = handle
        .as_ref()
        .map(|h| h.run_id.clone())
        .unwrap_or_default();

    let outcome = runner::run(spec, &request, &state.policy).await;
    let result = outcome.into_result();

    let status = if result.error.is_none() {
        StatusCode::OK
    } else if result.exit_code == 70 {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    };

    let mut response = serde_json::to_value(&result).unwrap_or_else(|_| json!({}));
    if let Value::Object(map) = &mut response {
        map.insert("run_id".to_string(), json!(run_id));
    }

    if let Some(handle) = &handle {
        let record = RunRecord {
            request: &request,
            resolved: spec,
            stdout_json: result.stdout_json.as_ref(),
            stderr: &result.stderr,
            result: &response,
        };
        if let Err(error) = state.audit.record(handle, record).await {
            tracing::warn!(%error, run_id = %handle.run_id, "failed to write audit records");
        }
    }

    Ok((status, Json(response)).into_response())
}

/// Fallback for unknown paths and methods.
pub(crate) async fn fallback() -> ApiError {
    ApiError::not_found()
}
