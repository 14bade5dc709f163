//! `DeployBackend` over the REST API

use async_trait::async_trait;
use tokio::fs;

use crate::backend::DeployBackend;
use crate::errors::DeployError;
use crate::http::client::HttpClient;
use crate::models::{
    Action, LogDescriptor, Operation, OperationFilter, OperationParameters, UploadedFile,
};

#[async_trait]
impl DeployBackend for HttpClient {
    async fn list_service_files(&self, service_id: &str) -> Result<Vec<UploadedFile>, DeployError> {
        self.get_service_files(service_id).await
    }

    async fn upload_service_file(
        &self,
        service_id: &str,
        file: fs::File,
        file_name: &str,
        size: u64,
    ) -> Result<UploadedFile, DeployError> {
        self.create_service_file(service_id, file, file_name, size).await
    }

    async fn list_operations(
        &self,
        filter: &OperationFilter,
    ) -> Result<Vec<Operation>, DeployError> {
        self.get_operations(filter).await
    }

    async fn get_operation(&self, operation_id: &str) -> Result<Option<Operation>, DeployError> {
        self.get_operation_by_id(operation_id).await
    }

    async fn start_operation(
        &self,
        service_id: &str,
        parameters: &OperationParameters,
    ) -> Result<Operation, DeployError> {
        self.create_process(service_id, parameters).await
    }

    async fn submit_action(&self, operation_id: &str, action: Action) -> Result<(), DeployError> {
        self.execute_action(operation_id, action).await
    }

    async fn list_logs(&self, operation_id: &str) -> Result<Vec<LogDescriptor>, DeployError> {
        self.get_logs(operation_id).await
    }

    async fn get_log_content(
        &self,
        operation_id: &str,
        log_id: &str,
        offset: u64,
    ) -> Result<Vec<u8>, DeployError> {
        self.get_log_content_since(operation_id, log_id, offset).await
    }
}
