//! Integration tests for task queue persistence
//!
//! These tests verify the queue endpoints against the on-disk document:
//! 1. Creation validates against the feature catalog
//! 2. Concurrent creates lose no tasks
//! 3. Failed updates leave the document untouched
//! 4. Queue and audit state stay consistent across operations

use axum::extract::{Path, State};
use axum::Json;
use mission_control_backend::api::tasks::{
    create_task, list_tasks, update_task, CreateTaskRequest, UpdateTaskRequest,
};
use mission_control_backend::config::{AuditConfig, Config, ServerConfig, StoreConfig, StreamConfig};
use mission_control_backend::error::AppError;
use mission_control_backend::queue::TaskQueueDocument;
use mission_control_backend::state::AppState;
use mission_control_backend::store::{FEATURES_DOC, TASK_QUEUE_DOC};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to create test AppState with a seeded feature catalog
async fn create_test_state(dir: &TempDir, feature_ids: &[&str]) -> Arc<AppState> {
    let data_dir = dir.path().to_path_buf();
    let state = Arc::new(AppState::new(Config {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        store: StoreConfig {
            logs_dir: data_dir.join("logs"),
            data_dir,
        },
        audit: AuditConfig { capacity: 100 },
        stream: StreamConfig {
            buffer_capacity: 1000,
            poll_interval_ms: 10,
        },
    }));

    let features: Vec<_> = feature_ids.iter().map(|id| json!({ "id": id })).collect();
    state
        .store
        .save(FEATURES_DOC, &json!({ "features": features }))
        .await
        .unwrap();
    state
}

fn create_request(feature_id: &str) -> CreateTaskRequest {
    CreateTaskRequest {
        feature_id: feature_id.to_string(),
        description: None,
        priority: None,
    }
}

#[tokio::test]
async fn test_create_then_update_round_trips_through_the_document() {
    let dir = TempDir::new().unwrap();
    let state = create_test_state(&dir, &["F1"]).await;

    let (_, created) = create_task(State(state.clone()), Json(create_request("F1")))
        .await
        .unwrap();
    assert_eq!(created.task.status, "pending");

    let updated = update_task(
        State(state.clone()),
        Path("F1".to_string()),
        Json(UpdateTaskRequest {
            status: "in_progress".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.task.status, "in_progress");
    assert!(updated.task.updated_at.is_some());

    let listed = list_tasks(State(state.clone())).await.unwrap();
    assert_eq!(listed.queue.len(), 1);
    assert_eq!(listed.queue[0].status, "in_progress");

    let entries = state.audit.snapshot().await;
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["task_created", "task_updated"]);
}

#[tokio::test]
async fn test_create_task_unknown_feature_leaves_queue_unchanged() {
    let dir = TempDir::new().unwrap();
    let state = create_test_state(&dir, &["F1"]).await;

    let err = create_task(State(state.clone()), Json(create_request("F9")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::FeatureNotFound(id) if id == "F9"));

    let listed = list_tasks(State(state)).await.unwrap();
    assert!(listed.queue.is_empty());
}

#[tokio::test]
async fn test_update_missing_task_leaves_document_bytes_unchanged() {
    let dir = TempDir::new().unwrap();
    let state = create_test_state(&dir, &["F1"]).await;
    create_task(State(state.clone()), Json(create_request("F1")))
        .await
        .unwrap();

    let path = dir.path().join(TASK_QUEUE_DOC);
    let before = std::fs::read(&path).unwrap();

    let err = update_task(
        State(state.clone()),
        Path("F9".to_string()),
        Json(UpdateTaskRequest {
            status: "done".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::TaskNotFound(_)));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_requests_lose_no_tasks() {
    let dir = TempDir::new().unwrap();
    let ids = ["F1", "F2", "F3", "F4", "F5", "F6"];
    let state = create_test_state(&dir, &ids).await;

    let mut handles = Vec::new();
    for id in ids {
        let state = Arc::clone(&state);
        handles.push(tokio::spawn(async move {
            create_task(State(state), Json(create_request(id))).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let doc: TaskQueueDocument = state.store.load(TASK_QUEUE_DOC).await.unwrap();
    assert_eq!(doc.queue.len(), ids.len());
    for id in ids {
        assert!(doc.queue.iter().any(|t| t.feature_id == id));
    }
    assert_eq!(state.audit.snapshot().await.len(), ids.len());
}

#[tokio::test]
async fn test_task_operations_publish_log_lines() {
    let dir = TempDir::new().unwrap();
    let state = create_test_state(&dir, &["F1"]).await;
    let mut subscriber = state.logs.subscribe().await;

    create_task(State(state.clone()), Json(create_request("F1")))
        .await
        .unwrap();
    update_task(
        State(state.clone()),
        Path("F1".to_string()),
        Json(UpdateTaskRequest {
            status: "done".to_string(),
        }),
    )
    .await
    .unwrap();

    let lines = subscriber.next_batch().await;
    assert_eq!(
        lines,
        vec![
            "task created for feature F1",
            "task F1 status: pending -> done"
        ]
    );
}
