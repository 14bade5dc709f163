//! API models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file stored by a deploy service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub id: String,
    pub file_name: String,
    pub digest: String,
    pub digest_algorithm: String,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub service: Option<String>,
}

/// Files response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Files {
    #[serde(default)]
    pub files: Vec<File>,
}

/// Operation as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub process_id: String,
    pub process_type: String,
    pub space_id: String,
    #[serde(default)]
    pub mta_id: Option<String>,
    /// One of RUNNING, ACTION_REQUIRED, ERROR, ABORTED, FINISHED
    pub state: String,
    #[serde(default)]
    pub acquired_lock: bool,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Operations response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operations {
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// Process parameters submitted when starting a process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessParameters {
    pub parameters: BTreeMap<String, String>,
}

/// Start process request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartProcessRequest {
    pub service: String,
    pub parameters: ProcessParameters,
}

/// Log descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub id: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Logs response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logs {
    #[serde(default)]
    pub logs: Vec<Log>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}
