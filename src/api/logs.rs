//! Log streaming and audit export handlers
//!
//! Serves the live SSE log stream, the audit-log snapshot, and a tail over
//! the on-disk `.log` files.

use crate::error::AppError;
use crate::state::{AppState, AuditEntry};
use crate::store::StoreError;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
};
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::info;

/// Default number of tailed lines returned
const DEFAULT_TAIL_LIMIT: usize = 100;

/// Number of most recent log files considered by the tail endpoint
const MAX_TAILED_FILES: usize = 5;

/// Audit log response
#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    /// Entries in append order, oldest first
    pub audit_log: Vec<AuditEntry>,
}

/// Query parameters for the log tail endpoint
#[derive(Debug, Deserialize)]
pub struct TailQuery {
    /// Maximum number of lines returned
    pub limit: Option<usize>,
}

/// One tailed log line with its source file
#[derive(Debug, Serialize)]
pub struct TailedLine {
    /// Log file the line came from
    pub file: String,
    /// The line itself
    pub line: String,
}

/// Log tail response
#[derive(Debug, Serialize)]
pub struct TailResponse {
    /// Tailed lines, oldest first
    pub logs: Vec<TailedLine>,
}

/// GET /api/logs/stream - Server-Sent Events stream of live log lines
///
/// Each subscriber paces itself; a disconnecting client drops the stream,
/// which detaches its subscriber without affecting others.
pub async fn stream_logs(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut subscriber = state.logs.subscribe().await;
    info!("Log stream subscriber connected");

    let stream = async_stream::stream! {
        loop {
            for line in subscriber.next_batch().await {
                yield Ok(Event::default().data(line));
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /api/audit-log - Snapshot of the audit trail
pub async fn get_audit_log(State(state): State<Arc<AppState>>) -> Json<AuditLogResponse> {
    Json(AuditLogResponse {
        audit_log: state.audit.snapshot().await,
    })
}

/// GET /api/logs - Tail of the most recent on-disk log files
pub async fn tail_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TailQuery>,
) -> Result<Json<TailResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_TAIL_LIMIT);
    let dir = &state.config.store.logs_dir;

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        // A missing logs directory just means nothing has been written yet
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(Json(TailResponse { logs: Vec::new() }))
        }
        Err(e) => return Err(StoreError::Io(e).into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(StoreError::Io)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".log") {
            names.push(name);
        }
    }
    // Most recent files, read in chronological order so the combined tail
    // keeps the newest lines
    names.sort();
    let recent = names.split_off(names.len().saturating_sub(MAX_TAILED_FILES));

    let mut logs = Vec::new();
    for name in recent {
        let content = tokio::fs::read_to_string(dir.join(&name))
            .await
            .map_err(StoreError::Io)?;
        let lines: Vec<&str> = content.lines().collect();
        let skip = lines.len().saturating_sub(limit);
        for line in &lines[skip..] {
            logs.push(TailedLine {
                file: name.clone(),
                line: line.trim().to_string(),
            });
        }
    }

    let skip = logs.len().saturating_sub(limit);
    Ok(Json(TailResponse {
        logs: logs.split_off(skip),
    }))
}
