//! In-memory deploy service used by the unit tests

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncReadExt;

use mtadeploy::backend::DeployBackend;
use mtadeploy::errors::DeployError;
use mtadeploy::models::{
    Action, LogDescriptor, Operation, OperationFilter, OperationParameters, OperationState,
    UploadedFile,
};
use mtadeploy::storage::settings::TargetSettings;

pub const SPACE_GUID: &str = "space-guid";
pub const MTA_ID: &str = "com.example.shop";
pub const LAUNCHED_ID: &str = "op-launched";
pub const MAIN_LOG: &str = "MAIN_LOG";

/// Backend call as observed by the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListFiles,
    Upload { file_name: String, size: u64 },
    ListOperations(OperationFilter),
    GetOperation(String),
    Start(OperationParameters),
    Action(String, Action),
    ListLogs(String),
    LogContent { log_id: String, offset: u64 },
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    service_files: Vec<UploadedFile>,
    ongoing: Vec<Operation>,
    operations: HashMap<String, Operation>,
    progressing: Option<String>,
    script: VecDeque<(OperationState, String)>,
    log: Vec<u8>,
    list_operations_error: Option<String>,
    upload_error: Option<String>,
    start_error: Option<String>,
    action_error: Option<String>,
}

/// Deterministic deploy service.
///
/// Once a process is started, or resumed or retried, every poll of that
/// operation advances a script of states and appends the step's text to
/// its log. The last step repeats once the script runs out.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// States reported by successive polls, with the log text each poll adds
    pub fn with_script(self, steps: &[(OperationState, &str)]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.script = steps
                .iter()
                .map(|(s, text)| (*s, text.to_string()))
                .collect();
        }
        self
    }

    /// Operations the service reports as active
    pub fn with_ongoing(self, operations: Vec<Operation>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for op in &operations {
                state.operations.insert(op.id.clone(), op.clone());
            }
            state.ongoing = operations;
        }
        self
    }

    /// An operation that can be looked up by id
    pub fn with_operation(self, operation: Operation) -> Self {
        self.state
            .lock()
            .unwrap()
            .operations
            .insert(operation.id.clone(), operation);
        self
    }

    /// Let polls of `operation_id` advance the script without a start or action
    pub fn progressing(self, operation_id: &str) -> Self {
        self.state.lock().unwrap().progressing = Some(operation_id.to_string());
        self
    }

    /// Raw log bytes already written before the first poll
    pub fn with_log_bytes(self, bytes: &[u8]) -> Self {
        self.state.lock().unwrap().log.extend_from_slice(bytes);
        self
    }

    pub fn with_service_file(self, file: UploadedFile) -> Self {
        self.state.lock().unwrap().service_files.push(file);
        self
    }

    pub fn failing_list_operations(self, message: &str) -> Self {
        self.state.lock().unwrap().list_operations_error = Some(message.to_string());
        self
    }

    pub fn failing_upload(self, message: &str) -> Self {
        self.state.lock().unwrap().upload_error = Some(message.to_string());
        self
    }

    pub fn failing_start(self, message: &str) -> Self {
        self.state.lock().unwrap().start_error = Some(message.to_string());
        self
    }

    pub fn failing_actions(self, message: &str) -> Self {
        self.state.lock().unwrap().action_error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload { file_name, .. } => Some(file_name),
                _ => None,
            })
            .collect()
    }

    pub fn started_parameters(&self) -> Option<OperationParameters> {
        self.calls().into_iter().find_map(|call| match call {
            Call::Start(params) => Some(params),
            _ => None,
        })
    }

    pub fn submitted_actions(&self) -> Vec<(String, Action)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Action(id, action) => Some((id, action)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl DeployBackend for FakeBackend {
    async fn list_service_files(&self, _service_id: &str) -> Result<Vec<UploadedFile>, DeployError> {
        self.record(Call::ListFiles);
        Ok(self.state.lock().unwrap().service_files.clone())
    }

    async fn upload_service_file(
        &self,
        _service_id: &str,
        mut file: fs::File,
        file_name: &str,
        size: u64,
    ) -> Result<UploadedFile, DeployError> {
        let mut content = Vec::new();
        file.read_to_end(&mut content).await?;
        assert_eq!(content.len() as u64, size);

        self.record(Call::Upload {
            file_name: file_name.to_string(),
            size,
        });
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.upload_error {
            return Err(DeployError::Backend(message.clone()));
        }
        let uploaded = UploadedFile {
            id: format!("file-{}", state.service_files.len() + 1),
            file_name: file_name.to_string(),
            digest: mtadeploy::utils::sha256_hash(&content).to_uppercase(),
            digest_algorithm: "SHA-256".to_string(),
        };
        state.service_files.push(uploaded.clone());
        Ok(uploaded)
    }

    async fn list_operations(&self, filter: &OperationFilter) -> Result<Vec<Operation>, DeployError> {
        self.record(Call::ListOperations(filter.clone()));
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.list_operations_error {
            return Err(DeployError::Backend(message.clone()));
        }
        Ok(state.ongoing.clone())
    }

    async fn get_operation(&self, operation_id: &str) -> Result<Option<Operation>, DeployError> {
        self.record(Call::GetOperation(operation_id.to_string()));
        let mut state = self.state.lock().unwrap();

        if state.progressing.as_deref() == Some(operation_id) {
            let step = if state.script.len() > 1 {
                state.script.pop_front()
            } else {
                state.script.front().cloned()
            };
            if let Some((next, text)) = step {
                state.log.extend_from_slice(text.as_bytes());
                if let Some(op) = state.operations.get_mut(operation_id) {
                    op.state = next;
                }
            }
        }
        Ok(state.operations.get(operation_id).cloned())
    }

    async fn start_operation(
        &self,
        _service_id: &str,
        parameters: &OperationParameters,
    ) -> Result<Operation, DeployError> {
        self.record(Call::Start(parameters.clone()));
        let operation = operation(LAUNCHED_ID, OperationState::Running, MTA_ID, true);
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.start_error {
            return Err(DeployError::Backend(message.clone()));
        }
        state.operations.insert(operation.id.clone(), operation.clone());
        state.progressing = Some(operation.id.clone());
        Ok(operation)
    }

    async fn submit_action(&self, operation_id: &str, action: Action) -> Result<(), DeployError> {
        self.record(Call::Action(operation_id.to_string(), action));
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.action_error {
            return Err(DeployError::Backend(message.clone()));
        }
        if action.continues_operation() {
            state.progressing = Some(operation_id.to_string());
        } else if let Some(op) = state.operations.get_mut(operation_id) {
            op.state = OperationState::Aborted;
        }
        Ok(())
    }

    async fn list_logs(&self, operation_id: &str) -> Result<Vec<LogDescriptor>, DeployError> {
        self.record(Call::ListLogs(operation_id.to_string()));
        Ok(vec![LogDescriptor {
            id: MAIN_LOG.to_string(),
        }])
    }

    async fn get_log_content(
        &self,
        _operation_id: &str,
        log_id: &str,
        offset: u64,
    ) -> Result<Vec<u8>, DeployError> {
        self.record(Call::LogContent {
            log_id: log_id.to_string(),
            offset,
        });
        let state = self.state.lock().unwrap();
        Ok(state.log.get(offset as usize..).unwrap_or_default().to_vec())
    }
}

pub fn operation(id: &str, state: OperationState, mta_id: &str, acquired_lock: bool) -> Operation {
    Operation {
        id: id.to_string(),
        space_id: SPACE_GUID.to_string(),
        mta_id: Some(mta_id.to_string()),
        kind: "deploy".to_string(),
        state,
        acquired_lock,
        started_at: None,
    }
}

pub fn target() -> TargetSettings {
    TargetSettings {
        org: "acme".to_string(),
        space: "dev".to_string(),
        space_guid: SPACE_GUID.to_string(),
        user: "jane".to_string(),
    }
}

/// Write an MTA archive whose descriptor declares [`MTA_ID`]
pub fn write_mtar(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("META-INF/mtad.yaml", options).unwrap();
    write!(zip, "_schema-version: '3.1'\nID: {}\nversion: 1.0.0\n", MTA_ID).unwrap();
    zip.start_file("web/index.html", options).unwrap();
    zip.write_all(b"<html></html>").unwrap();
    zip.finish().unwrap();
    path
}
