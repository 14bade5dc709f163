//! Operation models
//!
//! The backend owns the operation state machine. These types only reflect
//! what the last poll reported; nothing here is cached between polls.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DeployError;

/// Remote operation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationState {
    /// Operation is executing
    Running,

    /// Operation is paused until the user acts on it
    ActionRequired,

    /// Operation failed, can be retried or aborted
    Error,

    /// Operation was aborted
    Aborted,

    /// Operation completed successfully
    Finished,
}

impl OperationState {
    /// Whether monitoring stops in this state
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OperationState::Error | OperationState::Aborted | OperationState::Finished
        )
    }

    /// Whether an operation in this state still holds its MTA.
    ///
    /// Failed operations keep the lock until they are retried or aborted.
    pub fn holds_lock(self) -> bool {
        !matches!(self, OperationState::Aborted | OperationState::Finished)
    }

    /// Actions the backend accepts in this state
    pub fn allowed_actions(self) -> &'static [Action] {
        match self {
            OperationState::Running => &[Action::Abort],
            OperationState::ActionRequired => &[Action::Abort, Action::Resume],
            OperationState::Error => &[Action::Abort, Action::Retry],
            OperationState::Aborted | OperationState::Finished => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationState::Running => "RUNNING",
            OperationState::ActionRequired => "ACTION_REQUIRED",
            OperationState::Error => "ERROR",
            OperationState::Aborted => "ABORTED",
            OperationState::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationState {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RUNNING" => Ok(OperationState::Running),
            "ACTION_REQUIRED" => Ok(OperationState::ActionRequired),
            "ERROR" => Ok(OperationState::Error),
            "ABORTED" => Ok(OperationState::Aborted),
            "FINISHED" => Ok(OperationState::Finished),
            other => Err(DeployError::Backend(format!(
                "Unknown operation state {}",
                other
            ))),
        }
    }
}

/// Action that can be submitted for an existing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Abort,
    Retry,
    Resume,
}

impl Action {
    /// Name used on the command line and on the wire
    pub fn name(self) -> &'static str {
        match self {
            Action::Abort => "abort",
            Action::Retry => "retry",
            Action::Resume => "resume",
        }
    }

    /// Verb shown while the action is submitted
    pub fn progress_verb(self) -> &'static str {
        match self {
            Action::Abort => "Aborting",
            Action::Retry => "Retrying",
            Action::Resume => "Resuming",
        }
    }

    /// Whether the operation keeps running after the action
    pub fn continues_operation(self) -> bool {
        !matches!(self, Action::Abort)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(Action::Abort),
            "retry" => Ok(Action::Retry),
            "resume" => Ok(Action::Resume),
            other => Err(DeployError::InvalidAction(other.to_string())),
        }
    }
}

/// An operation observed on the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub id: String,
    pub space_id: String,
    pub mta_id: Option<String>,
    /// Kind of process, e.g. "deploy"
    pub kind: String,
    pub state: OperationState,
    /// Another actor holds the MTA through this operation
    pub acquired_lock: bool,
    pub started_at: Option<DateTime<Utc>>,
}

impl Operation {
    /// Whether the operation blocks a new deployment of `mta_id` in `space_id`
    pub fn conflicts_with(&self, space_id: &str, mta_id: &str) -> bool {
        self.space_id == space_id
            && self.mta_id.as_deref() == Some(mta_id)
            && self.acquired_lock
            && self.state.holds_lock()
    }
}

impl TryFrom<openapi_client::Operation> for Operation {
    type Error = DeployError;

    fn try_from(op: openapi_client::Operation) -> Result<Self, Self::Error> {
        Ok(Self {
            state: op.state.parse()?,
            id: op.process_id,
            space_id: op.space_id,
            mta_id: op.mta_id,
            kind: op.process_type,
            acquired_lock: op.acquired_lock,
            started_at: op.started_at,
        })
    }
}

/// Filter for listing operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationFilter {
    pub space_id: Option<String>,
    pub mta_id: Option<String>,
    /// Only operations the backend still considers active
    pub active_only: bool,
}

/// A log attached to an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDescriptor {
    pub id: String,
}

impl From<openapi_client::Log> for LogDescriptor {
    fn from(log: openapi_client::Log) -> Self {
        Self { id: log.id }
    }
}
