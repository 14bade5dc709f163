//! Deploy service abstraction
//!
//! Everything the orchestration needs from the remote deploy service goes
//! through this trait, so the deploy pipeline can run against the HTTP client
//! or against an in-memory fake in tests.

use async_trait::async_trait;
use tokio::fs;

use crate::errors::DeployError;
use crate::models::{
    Action, LogDescriptor, Operation, OperationFilter, OperationParameters, UploadedFile,
};

/// Deploy service trait for testability
#[async_trait]
pub trait DeployBackend: Send + Sync {
    /// List files already stored for a service
    async fn list_service_files(&self, service_id: &str) -> Result<Vec<UploadedFile>, DeployError>;

    /// Stream a local file to the service
    async fn upload_service_file(
        &self,
        service_id: &str,
        file: fs::File,
        file_name: &str,
        size: u64,
    ) -> Result<UploadedFile, DeployError>;

    /// List operations matching the filter
    async fn list_operations(&self, filter: &OperationFilter)
        -> Result<Vec<Operation>, DeployError>;

    /// Get an operation by id, `None` when it does not exist
    async fn get_operation(&self, operation_id: &str) -> Result<Option<Operation>, DeployError>;

    /// Start a new process for the service
    async fn start_operation(
        &self,
        service_id: &str,
        parameters: &OperationParameters,
    ) -> Result<Operation, DeployError>;

    /// Submit an action for an existing operation
    async fn submit_action(&self, operation_id: &str, action: Action) -> Result<(), DeployError>;

    /// List the logs of an operation
    async fn list_logs(&self, operation_id: &str) -> Result<Vec<LogDescriptor>, DeployError>;

    /// Read raw log content starting at a byte offset
    async fn get_log_content(
        &self,
        operation_id: &str,
        log_id: &str,
        offset: u64,
    ) -> Result<Vec<u8>, DeployError>;
}
