//! Process monitoring
//!
//! Polls an operation until it reaches a terminal state, printing new log
//! lines as they arrive. One request is in flight at a time and a failing
//! poll ends monitoring immediately.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::backend::DeployBackend;
use crate::errors::DeployError;
use crate::models::{Action, Operation, OperationState};
use crate::terminal::Terminal;

/// Monitor options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delay between two polls
    pub interval: Duration,

    /// Stop waiting after this long. `None` waits until a terminal state.
    pub timeout: Option<Duration>,

    /// Command name used in the hints printed for failed or paused processes
    pub command_name: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: None,
            command_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

/// Read position in one log.
///
/// The offset counts raw bytes as served and only grows, so every byte is
/// fetched once. Bytes after the last newline are held back until the line
/// is complete, which also keeps multi-byte characters split across reads
/// intact. Lines are decoded only when printed.
#[derive(Debug, Default)]
pub struct LogTail {
    offset: u64,
    pending: Vec<u8>,
}

impl LogTail {
    /// Byte offset of the next read
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Append fetched content, returning the lines it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.offset += chunk.len() as u64;
        self.pending.extend_from_slice(chunk);

        let Some(end) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };
        let rest = self.pending.split_off(end + 1);
        let complete = std::mem::replace(&mut self.pending, rest);
        complete[..end]
            .split(|b| *b == b'\n')
            .map(decode_line)
            .collect()
    }

    /// Take the unterminated remainder, if any
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(decode_line(&std::mem::take(&mut self.pending)))
        }
    }
}

fn decode_line(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Follows an operation to its terminal state
pub struct OperationMonitor<'a> {
    backend: &'a dyn DeployBackend,
    options: Options,
}

impl<'a> OperationMonitor<'a> {
    pub fn new(backend: &'a dyn DeployBackend, options: Options) -> Self {
        Self { backend, options }
    }

    /// Poll until the operation ends. Succeeds only for `FINISHED`.
    pub async fn monitor(
        &self,
        operation_id: &str,
        terminal: &mut Terminal,
    ) -> Result<(), DeployError> {
        terminal.say("Monitoring process execution...")?;

        let started = Instant::now();
        let mut tails: Vec<(String, LogTail)> = Vec::new();
        let mut hinted = false;

        loop {
            let operation = self.poll(operation_id).await?;
            self.print_new_log_lines(operation_id, &mut tails, terminal)
                .await?;
            debug!("Operation {} is {}", operation_id, operation.state);

            if operation.state.is_terminal() {
                for (_, tail) in tails.iter_mut() {
                    if let Some(rest) = tail.flush() {
                        terminal.say(rest)?;
                    }
                }
                return self.finish(&operation, terminal);
            }

            if operation.state == OperationState::ActionRequired {
                if !hinted {
                    self.print_action_hints(&operation, terminal)?;
                    hinted = true;
                }
            } else {
                hinted = false;
            }

            if let Some(timeout) = self.options.timeout {
                if started.elapsed() >= timeout {
                    return Err(DeployError::Timeout {
                        id: operation_id.to_string(),
                        secs: timeout.as_secs(),
                    });
                }
            }

            tokio::time::sleep(self.options.interval).await;
        }
    }

    async fn poll(&self, operation_id: &str) -> Result<Operation, DeployError> {
        self.backend
            .get_operation(operation_id)
            .await
            .map_err(|e| {
                DeployError::backend(
                    &format!("Could not monitor multi-target app operation with id {}", operation_id),
                    e,
                )
            })?
            .ok_or_else(|| DeployError::NotFound(operation_id.to_string()))
    }

    async fn print_new_log_lines(
        &self,
        operation_id: &str,
        tails: &mut Vec<(String, LogTail)>,
        terminal: &mut Terminal,
    ) -> Result<(), DeployError> {
        let logs = self
            .backend
            .list_logs(operation_id)
            .await
            .map_err(|e| DeployError::backend("Could not get process logs", e))?;

        for log in logs {
            let index = match tails.iter().position(|(id, _)| *id == log.id) {
                Some(index) => index,
                None => {
                    tails.push((log.id.clone(), LogTail::default()));
                    tails.len() - 1
                }
            };
            let tail = &mut tails[index].1;

            let content = self
                .backend
                .get_log_content(operation_id, &log.id, tail.offset())
                .await
                .map_err(|e| DeployError::backend(&format!("Could not get log {}", log.id), e))?;
            for line in tail.push(&content) {
                terminal.say(line)?;
            }
        }
        Ok(())
    }

    fn finish(&self, operation: &Operation, terminal: &mut Terminal) -> Result<(), DeployError> {
        terminal.say("Process finished.")?;
        if operation.state == OperationState::Finished {
            info!("Operation {} finished", operation.id);
            return Ok(());
        }

        // Failed processes keep the MTA locked until retried or aborted.
        if operation.state == OperationState::Error {
            self.print_action_hints(operation, terminal)?;
        }
        Err(DeployError::OperationFailed {
            id: operation.id.clone(),
            state: operation.state,
        })
    }

    fn print_action_hints(
        &self,
        operation: &Operation,
        terminal: &mut Terminal,
    ) -> Result<(), DeployError> {
        for action in operation.state.allowed_actions() {
            terminal.warn(self.hint(&operation.id, *action))?;
        }
        Ok(())
    }

    fn hint(&self, operation_id: &str, action: Action) -> String {
        format!(
            "Use \"{} -i {} -a {}\" to {} the process.",
            self.options.command_name,
            operation_id,
            action.name(),
            action.name()
        )
    }
}
