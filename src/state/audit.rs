//! Bounded audit trail
//!
//! Append-only record of state-changing actions shared between the agent
//! state machine and the API handlers. Oldest entries are evicted first once
//! the configured capacity is reached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// One recorded state-changing action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    /// When the action happened
    pub timestamp: DateTime<Utc>,
    /// Short action name, e.g. `agent_started` or `task_updated`
    pub action: String,
    /// Action-specific payload
    pub details: serde_json::Value,
}

/// Capacity-bounded, append-only audit log
///
/// `append` runs a brief critical section with no I/O, so it is safe to call
/// while another component holds its own lock.
#[derive(Debug)]
pub struct AuditLog {
    entries: RwLock<VecDeque<AuditEntry>>,
    capacity: usize,
}

impl AuditLog {
    /// Create an audit log retaining at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a timestamped entry, evicting the oldest past capacity
    pub async fn append(&self, action: &str, details: serde_json::Value) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            action: action.to_string(),
            details,
        };

        let mut entries = self.entries.write().await;
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Copy of the current entries in append order
    pub async fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries.read().await.iter().cloned().collect()
    }
}
