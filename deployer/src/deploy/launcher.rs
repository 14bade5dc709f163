//! Deploy process start

use tracing::info;

use crate::backend::DeployBackend;
use crate::errors::DeployError;
use crate::models::{FileSlot, OperationParameters, UploadedFile};
use crate::terminal::Terminal;

/// Starts deploy processes
pub struct OperationLauncher<'a> {
    backend: &'a dyn DeployBackend,
    service_id: &'a str,
}

impl<'a> OperationLauncher<'a> {
    pub fn new(backend: &'a dyn DeployBackend, service_id: &'a str) -> Self {
        Self {
            backend,
            service_id,
        }
    }

    /// Start a process referencing the uploaded files. Returns the operation id.
    pub async fn launch(
        &self,
        uploads: &[(FileSlot, UploadedFile)],
        parameters: OperationParameters,
        terminal: &mut Terminal,
    ) -> Result<String, DeployError> {
        let parameters = uploads
            .iter()
            .fold(parameters, |params, (slot, file)| {
                params.with(slot.parameter_id(), file.id.clone())
            });

        terminal.say("Starting deployment process...")?;
        let operation = self
            .backend
            .start_operation(self.service_id, &parameters)
            .await?;
        terminal.ok()?;

        info!(
            "Started {} operation {} with {} parameters",
            operation.kind,
            operation.id,
            parameters.len()
        );
        Ok(operation.id)
    }
}
