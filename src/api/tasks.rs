//! Task queue API handlers
//!
//! Contains HTTP request handlers for listing, creating, and updating queued
//! tasks. Mutations go through the `TaskQueueCoordinator`; the audit entries
//! for task changes are written here, at the call site.

use crate::error::AppError;
use crate::queue::{Task, TaskQueueDocument};
use crate::state::AppState;
use crate::store::TASK_QUEUE_DOC;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Catalog feature the task implements
    pub feature_id: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Optional priority label; defaults to `normal`
    pub priority: Option<String>,
}

/// Update task request
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// New task status
    pub status: String,
}

/// Task mutation response
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Outcome indicator: `created` or `updated`
    pub status: String,
    /// The affected task
    pub task: Task,
}

/// GET /api/tasks - The whole persisted task-queue document
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TaskQueueDocument>, AppError> {
    let doc: TaskQueueDocument = state.store.load(TASK_QUEUE_DOC).await?;
    Ok(Json(doc))
}

/// POST /api/tasks - Create a task for a catalog feature
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), AppError> {
    let task = state
        .tasks
        .create_task(&request.feature_id, request.description, request.priority)
        .await?;

    state
        .audit
        .append("task_created", json!({ "feature_id": task.feature_id }))
        .await;
    state
        .logs
        .publish(format!("task created for feature {}", task.feature_id))
        .await;
    info!(feature_id = %task.feature_id, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            status: "created".to_string(),
            task,
        }),
    ))
}

/// PATCH /api/tasks/:feature_id - Update the status of the first matching task
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(feature_id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    let updated = state.tasks.update_task(&feature_id, &request.status).await?;

    state
        .audit
        .append(
            "task_updated",
            json!({
                "feature_id": feature_id,
                "old_status": updated.previous_status,
                "new_status": updated.task.status,
            }),
        )
        .await;
    state
        .logs
        .publish(format!(
            "task {} status: {} -> {}",
            feature_id, updated.previous_status, updated.task.status
        ))
        .await;
    info!(
        feature_id = %feature_id,
        old_status = %updated.previous_status,
        new_status = %updated.task.status,
        "Task updated"
    );

    Ok(Json(TaskResponse {
        status: "updated".to_string(),
        task: updated.task,
    }))
}
