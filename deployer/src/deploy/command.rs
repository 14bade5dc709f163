//! Deploy command orchestration
//!
//! A validated [`DeployRequest`] either launches a new deployment or acts on
//! an existing operation. Both paths end in the operation monitor unless the
//! operation is concluded by the request itself.

use std::path::PathBuf;

use tracing::info;

use crate::app::options::DeployOptions;
use crate::backend::DeployBackend;
use crate::deploy::archive::{DeployableArchive, LocalArtifact};
use crate::deploy::conflicts::ConflictResolver;
use crate::deploy::dispatcher::ActionDispatcher;
use crate::deploy::launcher::OperationLauncher;
use crate::deploy::monitor::{self, OperationMonitor};
use crate::deploy::uploader::ArtifactUploader;
use crate::errors::DeployError;
use crate::models::FileSlot;
use crate::storage::settings::TargetSettings;
use crate::terminal::Terminal;

/// Deploy service that receives the files and runs the processes
pub const SERVICE_ID: &str = "xs2-deploy";

/// A new deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub archive: PathBuf,
    pub extension_descriptor: Option<PathBuf>,
    pub options: DeployOptions,
}

/// What one invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployRequest {
    Launch(LaunchRequest),
    Act {
        operation_id: String,
        action: String,
    },
}

pub struct DeployCommand<'a> {
    backend: &'a dyn DeployBackend,
    target: TargetSettings,
    monitor_options: monitor::Options,
}

impl<'a> DeployCommand<'a> {
    pub fn new(
        backend: &'a dyn DeployBackend,
        target: TargetSettings,
        monitor_options: monitor::Options,
    ) -> Self {
        Self {
            backend,
            target,
            monitor_options,
        }
    }

    pub async fn execute(
        &self,
        request: DeployRequest,
        terminal: &mut Terminal,
    ) -> Result<(), DeployError> {
        match request {
            DeployRequest::Launch(launch) => self.launch(launch, terminal).await,
            DeployRequest::Act {
                operation_id,
                action,
            } => {
                ActionDispatcher::new(self.backend, self.monitor_options.clone())
                    .dispatch(&operation_id, &action, terminal)
                    .await
            }
        }
    }

    async fn launch(
        &self,
        request: LaunchRequest,
        terminal: &mut Terminal,
    ) -> Result<(), DeployError> {
        terminal.say(format!(
            "Deploying multi-target app archive {} in org {} / space {} as {}...",
            request.archive.display(),
            self.target.org,
            self.target.space,
            self.target.user
        ))?;

        // Local files are checked before the deploy service is contacted.
        let archive = DeployableArchive::open(&request.archive).await?;
        let extension = match &request.extension_descriptor {
            Some(path) => Some(LocalArtifact::read(path, FileSlot::ExtensionDescriptor).await?),
            None => None,
        };
        info!(
            "Deploying MTA {} from {}",
            archive.mta_id,
            archive.artifact.file.path().display()
        );

        ConflictResolver::new(self.backend)
            .resolve(
                &self.target.space_guid,
                &archive.mta_id,
                request.options.force,
                terminal,
            )
            .await?;

        let uploader = ArtifactUploader::new(self.backend, SERVICE_ID);
        let mut uploads = Vec::with_capacity(2);
        for artifact in std::iter::once(&archive.artifact).chain(extension.as_ref()) {
            let uploaded = uploader.upload(artifact, terminal).await?;
            uploads.push((artifact.slot, uploaded));
        }

        let parameters = request.options.to_parameters(&self.target);
        let operation_id = OperationLauncher::new(self.backend, SERVICE_ID)
            .launch(&uploads, parameters, terminal)
            .await?;

        OperationMonitor::new(self.backend, self.monitor_options.clone())
            .monitor(&operation_id, terminal)
            .await
    }
}
