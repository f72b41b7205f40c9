//! Agent lifecycle state machine
//!
//! Owns the process-wide agent status and serializes every lifecycle
//! transition. A transition reads the current status, checks the
//! precondition, applies the new status, and records the audit entry as one
//! atomic unit behind a single mutex; failed transitions leave both the state
//! and the audit log untouched.

use crate::error::AppError;
use crate::state::audit::AuditLog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Agent lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Agent is not running
    Idle,
    /// Agent is currently running
    Running,
    /// Agent execution is suspended
    Paused,
    /// Agent reported a failure; cleared by `stop`
    Error,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Running => "running",
            AgentStatus::Paused => "paused",
            AgentStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Lifecycle actions accepted by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Begin running with an optional role and feature
    Start,
    /// Suspend a running agent
    Pause,
    /// Continue a paused agent
    Resume,
    /// Return to idle, clearing role, feature, and start time
    Stop,
}

impl ControlAction {
    /// The wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlAction::Start => "start",
            ControlAction::Pause => "pause",
            ControlAction::Resume => "resume",
            ControlAction::Stop => "stop",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(ControlAction::Start),
            "pause" => Ok(ControlAction::Pause),
            "resume" => Ok(ControlAction::Resume),
            "stop" => Ok(ControlAction::Stop),
            other => Err(AppError::UnknownAction(other.to_string())),
        }
    }
}

/// A parsed lifecycle control request
#[derive(Debug, Clone)]
pub struct ControlCommand {
    /// The action to apply
    pub action: ControlAction,
    /// Role the agent runs as (`start` only)
    pub role: Option<String>,
    /// Feature the agent works on (`start` only)
    pub feature_id: Option<String>,
}

/// The agent state at one instant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSnapshot {
    /// Current lifecycle status
    pub status: AgentStatus,
    /// Role the agent is running as, if any
    pub current_role: Option<String>,
    /// Feature the agent is working on, if any
    pub current_feature: Option<String>,
    /// When the current run started, if running or paused
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for AgentSnapshot {
    fn default() -> Self {
        Self {
            status: AgentStatus::Idle,
            current_role: None,
            current_feature: None,
            started_at: None,
        }
    }
}

/// Serializes lifecycle transitions for the single process-wide agent
#[derive(Debug)]
pub struct AgentStateMachine {
    current: Mutex<AgentSnapshot>,
    audit: Arc<AuditLog>,
}

impl AgentStateMachine {
    /// Create a state machine starting in `idle`, recording transitions to `audit`
    pub fn new(audit: Arc<AuditLog>) -> Self {
        Self {
            current: Mutex::new(AgentSnapshot::default()),
            audit,
        }
    }

    /// The agent state as of some instant during the call
    pub async fn snapshot(&self) -> AgentSnapshot {
        self.current.lock().await.clone()
    }

    /// Apply a lifecycle action, returning the resulting state
    ///
    /// The precondition check, the mutation, and the audit entry happen under
    /// one lock, so two racing `pause` calls cannot both succeed. The critical
    /// section performs no I/O.
    pub async fn apply(&self, command: ControlCommand) -> Result<AgentSnapshot, AppError> {
        let mut current = self.current.lock().await;

        match command.action {
            ControlAction::Start => {
                current.status = AgentStatus::Running;
                current.current_role = command.role.clone();
                current.current_feature = command.feature_id.clone();
                current.started_at = Some(Utc::now());
                self.audit
                    .append(
                        "agent_started",
                        json!({ "role": command.role, "feature_id": command.feature_id }),
                    )
                    .await;
            }
            ControlAction::Pause => {
                if current.status != AgentStatus::Running {
                    return Err(AppError::InvalidTransition {
                        action: command.action,
                        current: current.status,
                    });
                }
                current.status = AgentStatus::Paused;
                self.audit.append("agent_paused", json!({})).await;
            }
            ControlAction::Resume => {
                if current.status != AgentStatus::Paused {
                    return Err(AppError::InvalidTransition {
                        action: command.action,
                        current: current.status,
                    });
                }
                current.status = AgentStatus::Running;
                self.audit.append("agent_resumed", json!({})).await;
            }
            ControlAction::Stop => {
                current.status = AgentStatus::Idle;
                current.current_role = None;
                current.current_feature = None;
                current.started_at = None;
                self.audit.append("agent_stopped", json!({})).await;
            }
        }

        Ok(current.clone())
    }
}
