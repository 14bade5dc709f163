//! Artifact upload
//!
//! Uploads happen one file at a time, in the order the caller passes them.
//! The deploy process can only reference the archive once its upload has
//! completed, so nothing here runs in parallel.

use tracing::{debug, info, warn};

use crate::backend::DeployBackend;
use crate::deploy::archive::LocalArtifact;
use crate::errors::DeployError;
use crate::models::UploadedFile;
use crate::terminal::Terminal;

/// Uploads local artifacts to a deploy service
pub struct ArtifactUploader<'a> {
    backend: &'a dyn DeployBackend,
    service_id: &'a str,
}

impl<'a> ArtifactUploader<'a> {
    pub fn new(backend: &'a dyn DeployBackend, service_id: &'a str) -> Self {
        Self {
            backend,
            service_id,
        }
    }

    /// Upload one artifact, reusing an identical file the service already has
    pub async fn upload(
        &self,
        artifact: &LocalArtifact,
        terminal: &mut Terminal,
    ) -> Result<UploadedFile, DeployError> {
        let file_name = artifact.file_name();
        terminal.say("Uploading 1 files...")?;
        terminal.say(format!("  {}", artifact.file.path().display()))?;

        let existing = self
            .backend
            .list_service_files(self.service_id)
            .await
            .map_err(|e| DeployError::backend("Could not get service files", e))?;
        if let Some(found) = existing
            .into_iter()
            .find(|f| f.matches(&file_name, &artifact.digest))
        {
            info!("Reusing previously uploaded {} {} ({})", artifact.slot, file_name, found.id);
            terminal.ok()?;
            return Ok(found);
        }

        // Re-check right before streaming, the file may have gone since it was read.
        let stream = artifact.file.open().await?;
        debug!("Uploading {} ({} bytes) to {}", file_name, artifact.size, self.service_id);

        let uploaded = self
            .backend
            .upload_service_file(self.service_id, stream, &file_name, artifact.size)
            .await
            .map_err(|e| DeployError::backend(&format!("Could not upload file {}", file_name), e))?;

        if !uploaded.digest.eq_ignore_ascii_case(&artifact.digest) {
            warn!(
                "Digest of uploaded {} differs: local {}, service {} ({})",
                file_name, artifact.digest, uploaded.digest, uploaded.digest_algorithm
            );
        }

        terminal.ok()?;
        Ok(uploaded)
    }
}
