//! Error types for the MTA deployer

use thiserror::Error;

use crate::models::operation::OperationState;

/// Main error type for the MTA deployer
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Incorrect usage. {0}")]
    Usage(String),

    #[error("Could not find file {0}")]
    FileNotFound(String),

    #[error("Could not read MTA archive {path}: {reason}")]
    Archive { path: String, reason: String },

    #[error("{0}")]
    Backend(String),

    #[error("Multi-target app operation with id {0} not found")]
    NotFound(String),

    #[error("Invalid action {0}")]
    InvalidAction(String),

    #[error("Multi-target app operation with id {id} finished in state {state}")]
    OperationFailed { id: String, state: OperationState },

    #[error("Timed out after {secs}s monitoring multi-target app operation with id {id}")]
    Timeout { id: String, secs: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DeployError {
    /// Wrap a backend failure with a leading context message
    pub fn backend(context: &str, cause: impl std::fmt::Display) -> Self {
        DeployError::Backend(format!("{}: {}", context, cause))
    }

    /// Whether the failure came from bad command line input
    pub fn is_usage(&self) -> bool {
        matches!(self, DeployError::Usage(_))
    }
}
