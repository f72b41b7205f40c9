//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::state::{AgentStatus, ControlAction};
use crate::store::StoreError;

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Lifecycle action is not legal in the agent's current state
    #[error("cannot {action} while agent is {current}")]
    InvalidTransition {
        /// The action that was attempted
        action: ControlAction,
        /// The agent status at the time of the attempt
        current: AgentStatus,
    },

    /// Control command is not one of start/pause/resume/stop
    #[error("unknown agent action: {0}")]
    UnknownAction(String),

    /// Task creation referenced a feature missing from the catalog
    #[error("feature not found: {0}")]
    FeatureNotFound(String),

    /// Task update referenced a feature with no task in the queue
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// Error occurred while reading or writing a persisted document
    #[error("persistence error: {0}")]
    Store(#[from] StoreError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidTransition { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::UnknownAction(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::FeatureNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::TaskNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
