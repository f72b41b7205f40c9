// Application state
// Owns the shared components injected into request handlers

use crate::config::Config;
use crate::logs::LogBroadcaster;
use crate::queue::TaskQueueCoordinator;
use crate::state::agent::AgentStateMachine;
use crate::state::audit::AuditLog;
use crate::store::DocumentStore;
use std::sync::Arc;

/// Shared application state
///
/// Each component guards its own state with its own primitive; there is no
/// outer lock, so agent transitions, queue persistence, and log streaming
/// never serialize against each other.
#[derive(Debug)]
pub struct AppState {
    /// Effective configuration
    pub config: Config,
    /// Audit trail shared by the state machine and the handlers
    pub audit: Arc<AuditLog>,
    /// Agent lifecycle state machine
    pub agent: AgentStateMachine,
    /// Persisted JSON document access
    pub store: DocumentStore,
    /// Task-queue mutation coordinator
    pub tasks: TaskQueueCoordinator,
    /// Live log line broadcaster
    pub logs: LogBroadcaster,
}

impl AppState {
    /// Wire up the components from configuration
    pub fn new(config: Config) -> Self {
        let audit = Arc::new(AuditLog::new(config.audit.capacity));
        let agent = AgentStateMachine::new(Arc::clone(&audit));
        let store = DocumentStore::new(config.store.data_dir.clone());
        let tasks = TaskQueueCoordinator::new(store.clone());
        let logs = LogBroadcaster::new(
            config.stream.buffer_capacity,
            config.stream.poll_interval(),
        );

        Self {
            config,
            audit,
            agent,
            store,
            tasks,
            logs,
        }
    }
}
