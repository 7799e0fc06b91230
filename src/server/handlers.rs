//! Request handlers. Each one parses its input, then runs the inventory call
//! on the blocking pool under the configured timeout.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::error::{DbError, Result};
use crate::inventory::{CallGate, Inventory, Session};
use crate::models::{BackupInfo, Record, RecordEntry};

use super::error::{ApiError, ApiResult};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    inventory: Arc<Inventory>,
    io_timeout: Duration,
}

impl AppState {
    #[must_use]
    pub fn new(inventory: Arc<Inventory>, io_timeout: Duration) -> Self {
        Self {
            inventory,
            io_timeout,
        }
    }

    /// Run an inventory call on the blocking pool.
    ///
    /// The timeout bounds the wait for the writer lock. A call that times out
    /// is abandoned and never writes; a call that already holds the lock is
    /// awaited and its own result is reported.
    async fn run<T, F>(&self, op: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Session<'_>) -> Result<T> + Send + 'static,
    {
        let inventory = Arc::clone(&self.inventory);
        let gate = CallGate::new();
        let task_gate = gate.clone();
        let mut task = tokio::task::spawn_blocking(move || {
            let session = inventory.session_gated(&task_gate)?;
            op(&session)
        });

        let waited = tokio::time::timeout(self.io_timeout, &mut task).await;
        let joined = match waited {
            Ok(joined) => joined,
            Err(_) if gate.abandon() => {
                return Err(DbError::Timeout {
                    millis: u64::try_from(self.io_timeout.as_millis()).unwrap_or(u64::MAX),
                }
                .into())
            }
            Err(_) => task.await,
        };

        match joined {
            Ok(result) => result.map_err(ApiError::from),
            Err(join) => Err(DbError::Other(format!("store task failed: {join}")).into()),
        }
    }
}

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

fn parse_line_number(raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| DbError::InvalidLineNumber { raw: raw.into() })
}

/// Buffer failures keep the `{"error": ...}` shape; an over-limit body is 413.
fn read_body(body: std::result::Result<Bytes, BytesRejection>) -> ApiResult<Bytes> {
    body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::UnreadableBody(rejection.body_text())
        }
    })
}

fn parse_body(body: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(body)?)
}

/// Optional insert position. Accepts a number or a numeric string; `null`
/// and absence both mean "append".
fn insert_after(body: &Value) -> Result<Option<usize>> {
    let invalid = || DbError::InvalidField {
        field: "insertAfterLine",
        detail: "expected a non-negative line number".into(),
    };
    match body.get("insertAfterLine") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

pub async fn list_records(State(state): State<AppState>) -> ApiResult<Json<Vec<RecordEntry>>> {
    let entries = state.run(|s| s.list()).await?;
    Ok(Json(entries))
}

pub async fn add_record(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> ApiResult<Json<Value>> {
    let body = parse_body(&read_body(body)?)?;
    let after = insert_after(&body)?;
    let record = Record::from_json(&body)?;
    state.run(move |s| s.add(&record, after)).await?;
    Ok(success())
}

pub async fn update_record(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> ApiResult<Json<Value>> {
    let line = parse_line_number(&raw)?;
    let record = Record::from_json(&parse_body(&read_body(body)?)?)?;
    state.run(move |s| s.edit(line, &record)).await?;
    Ok(success())
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> ApiResult<Json<Value>> {
    let line = parse_line_number(&raw)?;
    state.run(move |s| s.delete(line)).await?;
    Ok(success())
}

pub async fn list_backups(State(state): State<AppState>) -> ApiResult<Json<Vec<BackupInfo>>> {
    let backups = state.run(|s| s.backups()).await?;
    Ok(Json(backups))
}

pub async fn restore_backup(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    state.run(move |s| s.restore(&name)).await?;
    Ok(success())
}

pub async fn put_without_line() -> ApiError {
    ApiError::MissingLineNumber { method: "PUT" }
}

pub async fn delete_without_line() -> ApiError {
    ApiError::MissingLineNumber { method: "DELETE" }
}

/// Bare OPTIONS requests that did not qualify as CORS pre-flights.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
