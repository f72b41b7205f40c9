//! Persisted JSON document access
//!
//! Handles loading and saving the named JSON documents (task queue, feature
//! catalog) kept in the data directory. Documents are read and written whole;
//! a missing file loads as the document's empty value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// File name of the persisted task-queue document
pub const TASK_QUEUE_DOC: &str = "task-queue.json";

/// File name of the persisted feature catalog document
pub const FEATURES_DOC: &str = "features.json";

/// Error types for document store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// File I/O error
    #[error("document io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("document parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value access to named JSON documents on disk
///
/// Cheap to clone; holds only the data directory path. Callers that
/// read-modify-write a document are responsible for their own serialization
/// (see `TaskQueueCoordinator`) — the store itself performs one whole-document
/// read or write per call.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    /// Create a store rooted at the given data directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the named document, returning the empty document if the file is absent
    pub async fn load<T>(&self, name: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        match tokio::fs::read_to_string(self.dir.join(name)).await {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Save the named document, replacing any previous contents
    pub async fn save<T: Serialize>(&self, name: &str, doc: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(doc)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(name), json).await?;
        Ok(())
    }
}

/// One catalog feature; fields beyond `id` are carried through untouched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureEntry {
    /// Catalog identifier referenced by tasks
    pub id: String,
    /// Remaining feature fields, preserved as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The persisted feature catalog document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeatureCatalogDocument {
    /// Ordered sequence of catalog features
    #[serde(default)]
    pub features: Vec<FeatureEntry>,
}

/// Read-only view over the feature catalog document
#[derive(Debug, Clone)]
pub struct FeatureCatalog {
    store: DocumentStore,
}

impl FeatureCatalog {
    /// Create a catalog reader over the given store
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Read the set of known feature ids, fresh from disk
    pub async fn feature_ids(&self) -> Result<HashSet<String>, StoreError> {
        let doc: FeatureCatalogDocument = self.store.load(FEATURES_DOC).await?;
        Ok(doc.features.into_iter().map(|f| f.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_missing_document_returns_empty() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());

        let doc: FeatureCatalogDocument = store.load(FEATURES_DOC).await.unwrap();
        assert!(doc.features.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());

        let doc = FeatureCatalogDocument {
            features: vec![FeatureEntry {
                id: "F1".to_string(),
                extra: serde_json::Map::new(),
            }],
        };
        store.save(FEATURES_DOC, &doc).await.unwrap();

        let loaded: FeatureCatalogDocument = store.load(FEATURES_DOC).await.unwrap();
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn test_load_malformed_document_fails() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());
        std::fs::write(dir.path().join(FEATURES_DOC), "not json").unwrap();

        let result: Result<FeatureCatalogDocument, _> = store.load(FEATURES_DOC).await;
        assert!(matches!(result, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_feature_ids_preserves_extra_fields() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());
        store
            .save(
                FEATURES_DOC,
                &json!({
                    "features": [
                        {"id": "F1", "title": "Login flow", "owner": "web"},
                        {"id": "F2", "title": "Billing"},
                    ]
                }),
            )
            .await
            .unwrap();

        let catalog = FeatureCatalog::new(store.clone());
        let ids = catalog.feature_ids().await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("F1") && ids.contains("F2"));

        // Unknown fields survive a load/save cycle
        let doc: FeatureCatalogDocument = store.load(FEATURES_DOC).await.unwrap();
        assert_eq!(doc.features[0].extra["title"], json!("Login flow"));
    }

    #[tokio::test]
    async fn test_feature_ids_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let catalog = FeatureCatalog::new(DocumentStore::new(dir.path()));
        assert!(catalog.feature_ids().await.unwrap().is_empty());
    }
}
