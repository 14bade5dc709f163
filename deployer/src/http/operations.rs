//! Operations API client

use crate::errors::DeployError;
use crate::http::client::HttpClient;
use crate::models::{
    Action, LogDescriptor, Operation, OperationFilter, OperationParameters,
};

impl HttpClient {
    /// Get operations matching a filter
    pub async fn get_operations(&self, filter: &OperationFilter) -> Result<Vec<Operation>, DeployError> {
        let url = self.url(&["operations"]);
        let mut query = Vec::new();
        if let Some(space_id) = &filter.space_id {
            query.push(("spaceId", space_id.as_str()));
        }
        if let Some(mta_id) = &filter.mta_id {
            query.push(("mtaId", mta_id.as_str()));
        }
        if filter.active_only {
            query.push(("state", "active"));
        }

        let response: openapi_client::Operations = self.get(url, &query).await?;
        response
            .operations
            .into_iter()
            .map(Operation::try_from)
            .collect()
    }

    /// Get a single operation
    pub async fn get_operation_by_id(&self, operation_id: &str) -> Result<Option<Operation>, DeployError> {
        let url = self.url(&["operations", operation_id]);
        let operation: Option<openapi_client::Operation> = self.get_optional(url).await?;
        operation.map(Operation::try_from).transpose()
    }

    /// Start a process for a service
    pub async fn create_process(
        &self,
        service_id: &str,
        parameters: &OperationParameters,
    ) -> Result<Operation, DeployError> {
        let url = self.url(&["services", service_id, "processes"]);
        let body = openapi_client::StartProcessRequest {
            service: service_id.to_string(),
            parameters: parameters.clone().into(),
        };
        let operation: openapi_client::Operation = self.post(url, &body).await?;
        Operation::try_from(operation)
    }

    /// Execute an action on an operation
    pub async fn execute_action(&self, operation_id: &str, action: Action) -> Result<(), DeployError> {
        let url = self.url(&["operations", operation_id, "actions", action.name()]);
        self.post_empty(url).await
    }

    /// Get the logs of an operation
    pub async fn get_logs(&self, operation_id: &str) -> Result<Vec<LogDescriptor>, DeployError> {
        let url = self.url(&["operations", operation_id, "logs"]);
        let response: openapi_client::Logs = self.get(url, &[]).await?;
        Ok(response.logs.into_iter().map(LogDescriptor::from).collect())
    }

    /// Get log content after a byte offset
    pub async fn get_log_content_since(
        &self,
        operation_id: &str,
        log_id: &str,
        offset: u64,
    ) -> Result<Vec<u8>, DeployError> {
        let url = self.url(&["operations", operation_id, "logs", log_id, "content"]);
        let offset = offset.to_string();
        self.get_bytes(url, &[("offset", offset.as_str())]).await
    }
}
