//! Actions on existing operations

use tracing::info;

use crate::backend::DeployBackend;
use crate::deploy::monitor::{self, OperationMonitor};
use crate::errors::DeployError;
use crate::models::Action;
use crate::terminal::Terminal;

/// Submits abort, retry and resume for a known operation
pub struct ActionDispatcher<'a> {
    backend: &'a dyn DeployBackend,
    monitor_options: monitor::Options,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(backend: &'a dyn DeployBackend, monitor_options: monitor::Options) -> Self {
        Self {
            backend,
            monitor_options,
        }
    }

    /// Execute `action_name` on `operation_id`.
    ///
    /// The operation is looked up first so an unknown id or an action the
    /// current state does not accept fails without touching the operation.
    /// Retry and resume keep monitoring until the process ends.
    pub async fn dispatch(
        &self,
        operation_id: &str,
        action_name: &str,
        terminal: &mut Terminal,
    ) -> Result<(), DeployError> {
        let operation = self
            .backend
            .get_operation(operation_id)
            .await
            .map_err(|e| {
                DeployError::backend(
                    &format!("Could not get multi-target app operation with id {}", operation_id),
                    e,
                )
            })?
            .ok_or_else(|| DeployError::NotFound(operation_id.to_string()))?;

        let action: Action = action_name.parse()?;
        if !operation.state.allowed_actions().contains(&action) {
            info!(
                "Action {} rejected for operation {} in state {}",
                action, operation.id, operation.state
            );
            return Err(DeployError::InvalidAction(action_name.to_string()));
        }

        terminal.say(format!(
            "{} multi-target app operation with id {}...",
            action.progress_verb(),
            operation.id
        ))?;
        self.backend
            .submit_action(&operation.id, action)
            .await
            .map_err(|e| {
                DeployError::backend(
                    &format!("Could not execute action {} on operation {}", action, operation.id),
                    e,
                )
            })?;
        terminal.ok()?;

        if action.continues_operation() {
            OperationMonitor::new(self.backend, self.monitor_options.clone())
                .monitor(&operation.id, terminal)
                .await?;
        }
        Ok(())
    }
}
