//! Conflicting operation detection

use tracing::{info, warn};

use crate::backend::DeployBackend;
use crate::errors::DeployError;
use crate::models::{Action, Operation, OperationFilter};
use crate::terminal::Terminal;

/// Finds operations holding the MTA and aborts them when forced
pub struct ConflictResolver<'a> {
    backend: &'a dyn DeployBackend,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(backend: &'a dyn DeployBackend) -> Self {
        Self { backend }
    }

    /// Operations in `space_id` that currently hold `mta_id`
    pub async fn ongoing_operations(
        &self,
        space_id: &str,
        mta_id: &str,
    ) -> Result<Vec<Operation>, DeployError> {
        let filter = OperationFilter {
            space_id: Some(space_id.to_string()),
            mta_id: Some(mta_id.to_string()),
            active_only: true,
        };
        let operations = self
            .backend
            .list_operations(&filter)
            .await
            .map_err(|e| DeployError::backend("Could not get ongoing operation", e))?;

        Ok(operations
            .into_iter()
            .filter(|op| op.conflicts_with(space_id, mta_id))
            .collect())
    }

    /// Clear the way for a new deployment.
    ///
    /// Without `force` conflicting operations are left alone and the caller
    /// proceeds anyway. With `force` each of them is aborted, in the order the
    /// service listed them. Returns the ids of the aborted operations.
    pub async fn resolve(
        &self,
        space_id: &str,
        mta_id: &str,
        force: bool,
        terminal: &mut Terminal,
    ) -> Result<Vec<String>, DeployError> {
        let ongoing = self.ongoing_operations(space_id, mta_id).await?;
        if ongoing.is_empty() {
            return Ok(Vec::new());
        }

        if !force {
            let ids: Vec<&str> = ongoing.iter().map(|op| op.id.as_str()).collect();
            warn!("MTA {} has ongoing operations {:?}, deploying anyway", mta_id, ids);
            return Ok(Vec::new());
        }

        let mut aborted = Vec::with_capacity(ongoing.len());
        for operation in ongoing {
            terminal.say(format!(
                "Aborting multi-target app operation with id {}...",
                operation.id
            ))?;
            self.backend
                .submit_action(&operation.id, Action::Abort)
                .await
                .map_err(|e| {
                    DeployError::backend(
                        &format!("Could not abort multi-target app operation with id {}", operation.id),
                        e,
                    )
                })?;
            terminal.ok()?;
            info!("Aborted operation {} ({}) for MTA {}", operation.id, operation.kind, mta_id);
            aborted.push(operation.id);
        }

        Ok(aborted)
    }
}
