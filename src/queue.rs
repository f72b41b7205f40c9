//! Task queue coordination
//!
//! Serializes read-modify-write cycles against the persisted task-queue
//! document so that concurrent create and update requests compose without
//! losing updates. Persistence is whole-document replace, so the critical
//! section is per document, not per task.

use crate::error::AppError;
use crate::store::{DocumentStore, FeatureCatalog, TASK_QUEUE_DOC};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Status assigned to newly created tasks
pub const STATUS_PENDING: &str = "pending";

/// Priority assigned when the caller does not specify one
pub const DEFAULT_PRIORITY: &str = "normal";

/// A queued unit of work tied to a catalog feature
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Feature this task implements; validated against the catalog at creation
    pub feature_id: String,
    /// Current task status
    pub status: String,
    /// Optional free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the task was created
    pub created_at: DateTime<Utc>,
    /// When the task status last changed, if ever
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Scheduling priority label
    pub priority: String,
}

/// The persisted task-queue document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskQueueDocument {
    /// Ordered sequence of tasks
    #[serde(default)]
    pub queue: Vec<Task>,
}

/// Result of a status update, carrying the prior status for the audit entry
#[derive(Debug, Clone)]
pub struct UpdatedTask {
    /// The task after the update
    pub task: Task,
    /// The status it had before
    pub previous_status: String,
}

/// Serializes task-queue mutations against the document store
///
/// One async mutex per document name guards the whole validate → mutate →
/// persist sequence; unrelated documents never contend. This is the only lock
/// in the system held across file I/O.
#[derive(Debug)]
pub struct TaskQueueCoordinator {
    store: DocumentStore,
    catalog: FeatureCatalog,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TaskQueueCoordinator {
    /// Create a coordinator over the given store
    pub fn new(store: DocumentStore) -> Self {
        let catalog = FeatureCatalog::new(store.clone());
        Self {
            store,
            catalog,
            locks: Mutex::new(HashMap::new()),
        }
    }

    // One guard per document name, created on first use. The map lock is held
    // only long enough to clone the Arc.
    async fn document_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    /// Create a `pending` task for a catalog feature and persist the queue
    ///
    /// The feature catalog is re-read inside the critical section so the
    /// existence check is current at insertion time. Duplicate feature ids in
    /// the queue are allowed; see `update_task` for the matching rule.
    pub async fn create_task(
        &self,
        feature_id: &str,
        description: Option<String>,
        priority: Option<String>,
    ) -> Result<Task, AppError> {
        let lock = self.document_lock(TASK_QUEUE_DOC).await;
        let _guard = lock.lock().await;

        let known = self.catalog.feature_ids().await?;
        if !known.contains(feature_id) {
            return Err(AppError::FeatureNotFound(feature_id.to_string()));
        }

        let mut doc: TaskQueueDocument = self.store.load(TASK_QUEUE_DOC).await?;
        let task = Task {
            feature_id: feature_id.to_string(),
            status: STATUS_PENDING.to_string(),
            description,
            created_at: Utc::now(),
            updated_at: None,
            priority: priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        };
        doc.queue.push(task.clone());
        self.store.save(TASK_QUEUE_DOC, &doc).await?;

        Ok(task)
    }

    /// Set the status of the first task matching `feature_id` and persist
    ///
    /// Returns the updated task together with its previous status. When no
    /// task matches, the document is not rewritten at all.
    pub async fn update_task(
        &self,
        feature_id: &str,
        new_status: &str,
    ) -> Result<UpdatedTask, AppError> {
        let lock = self.document_lock(TASK_QUEUE_DOC).await;
        let _guard = lock.lock().await;

        let mut doc: TaskQueueDocument = self.store.load(TASK_QUEUE_DOC).await?;
        let task = doc
            .queue
            .iter_mut()
            .find(|t| t.feature_id == feature_id)
            .ok_or_else(|| AppError::TaskNotFound(feature_id.to_string()))?;

        let previous_status = std::mem::replace(&mut task.status, new_status.to_string());
        task.updated_at = Some(Utc::now());
        let task = task.clone();
        self.store.save(TASK_QUEUE_DOC, &doc).await?;

        Ok(UpdatedTask {
            task,
            previous_status,
        })
    }
}
