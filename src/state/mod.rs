// State management module
// Agent lifecycle, audit trail, and the shared application context

pub mod agent;
pub mod app_state;
pub mod audit;

pub use agent::{AgentSnapshot, AgentStateMachine, AgentStatus, ControlAction, ControlCommand};
pub use app_state::AppState;
pub use audit::{AuditEntry, AuditLog};
