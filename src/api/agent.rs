//! Agent control API handlers
//!
//! Contains HTTP request handlers for driving the agent lifecycle and
//! reading the combined status view.

use crate::error::AppError;
use crate::queue::TaskQueueDocument;
use crate::state::{AgentSnapshot, AgentStatus, AppState, ControlCommand};
use crate::store::{FeatureCatalogDocument, FEATURES_DOC, TASK_QUEUE_DOC};
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Agent control request
#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    /// Lifecycle action: `start`, `pause`, `resume`, or `stop`
    pub action: String,
    /// Role to run the agent as (`start` only)
    pub role: Option<String>,
    /// Feature the agent should work on (`start` only)
    pub feature_id: Option<String>,
}

/// Agent control response
#[derive(Debug, Serialize)]
pub struct ControlResponse {
    /// Agent status after the transition
    pub status: AgentStatus,
}

/// Combined status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Current agent state
    pub agent: AgentSnapshot,
    /// Persisted task queue
    pub queue: TaskQueueDocument,
    /// Persisted feature catalog
    pub features: FeatureCatalogDocument,
    /// When this snapshot was taken
    pub timestamp: DateTime<Utc>,
}

/// POST /api/agent/control - Apply a lifecycle action to the agent
pub async fn control_agent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ControlRequest>,
) -> Result<Json<ControlResponse>, AppError> {
    let action = request.action.parse()?;
    let snapshot = state
        .agent
        .apply(ControlCommand {
            action,
            role: request.role,
            feature_id: request.feature_id,
        })
        .await?;

    info!(
        action = %action,
        status = %snapshot.status,
        "Agent lifecycle transition"
    );
    state
        .logs
        .publish(format!("agent control: {} -> {}", action, snapshot.status))
        .await;

    Ok(Json(ControlResponse {
        status: snapshot.status,
    }))
}

/// GET /api/status - Agent snapshot plus the persisted queue and catalog
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, AppError> {
    let agent = state.agent.snapshot().await;
    let queue: TaskQueueDocument = state.store.load(TASK_QUEUE_DOC).await?;
    let features: FeatureCatalogDocument = state.store.load(FEATURES_DOC).await?;

    Ok(Json(StatusResponse {
        agent,
        queue,
        features,
        timestamp: Utc::now(),
    }))
}
