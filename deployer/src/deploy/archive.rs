//! Local artifacts handed to the deploy service

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::models::FileSlot;

const DEPLOYMENT_DESCRIPTOR: &str = "META-INF/mtad.yaml";
const MANIFEST: &str = "META-INF/MANIFEST.MF";

/// The part of `mtad.yaml` needed before deploying
#[derive(Debug, Deserialize)]
struct Descriptor {
    #[serde(rename = "ID", default)]
    id: Option<String>,
}

/// A local file ready to be uploaded
#[derive(Debug, Clone)]
pub struct LocalArtifact {
    /// Absolute location of the file
    pub file: File,
    pub slot: FileSlot,
    /// Upper-case SHA-256 of the content
    pub digest: String,
    pub size: u64,
}

impl LocalArtifact {
    /// Resolve, check and fingerprint a local file
    pub async fn read(path: impl AsRef<Path>, slot: FileSlot) -> Result<Self, DeployError> {
        let file = File::absolute(path)?;
        file.ensure_exists().await?;
        let size = file.size().await?;
        let digest = file.sha256_digest().await?;
        debug!("{} {} has {} bytes, digest {}", slot, file.path().display(), size, digest);

        Ok(Self {
            file,
            slot,
            digest,
            size,
        })
    }

    pub fn file_name(&self) -> String {
        self.file.file_name()
    }
}

/// The MTA archive with the id read from its descriptor
#[derive(Debug, Clone)]
pub struct DeployableArchive {
    pub artifact: LocalArtifact,
    pub mta_id: String,
}

impl DeployableArchive {
    /// Read an MTA archive from disk
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DeployError> {
        let artifact = LocalArtifact::read(path, FileSlot::Archive).await?;
        let archive_path = artifact.file.path().to_path_buf();
        let mta_id = tokio::task::spawn_blocking(move || read_mta_id(&archive_path))
            .await
            .map_err(|e| DeployError::Archive {
                path: artifact.file.path().display().to_string(),
                reason: e.to_string(),
            })??;

        Ok(Self { artifact, mta_id })
    }
}

/// Read the MTA id from the deployment descriptor, falling back to the manifest
pub fn read_mta_id(path: &Path) -> Result<String, DeployError> {
    let archive_error = |reason: String| DeployError::Archive {
        path: path.display().to_string(),
        reason,
    };

    let reader = std::fs::File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(reader).map_err(|e| archive_error(e.to_string()))?;

    if let Some(descriptor) = read_entry(&mut archive, DEPLOYMENT_DESCRIPTOR)? {
        // An empty document parses as `None`.
        let descriptor: Option<Descriptor> = serde_yaml::from_str(&descriptor)
            .map_err(|e| archive_error(format!("invalid {}: {}", DEPLOYMENT_DESCRIPTOR, e)))?;
        let id = descriptor.and_then(|d| d.id);
        if let Some(id) = id.filter(|id| !id.trim().is_empty()) {
            return Ok(id);
        }
    }
    if let Some(manifest) = read_entry(&mut archive, MANIFEST)? {
        if let Some(id) = manifest_value(&manifest, "MTA-ID") {
            return Ok(id);
        }
    }

    Err(archive_error(format!(
        "no MTA id in {} or {}",
        DEPLOYMENT_DESCRIPTOR, MANIFEST
    )))
}

fn read_entry(
    archive: &mut zip::ZipArchive<std::fs::File>,
    name: &str,
) -> Result<Option<String>, DeployError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(DeployError::Archive {
                path: name.to_string(),
                reason: e.to_string(),
            })
        }
    };
    let mut contents = String::new();
    entry.read_to_string(&mut contents)?;
    Ok(Some(contents))
}

fn manifest_value(manifest: &str, key: &str) -> Option<String> {
    manifest
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
