//! File operations

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncReadExt;

use crate::errors::DeployError;
use crate::utils::hex;

const DIGEST_CHUNK_SIZE: usize = 64 * 1024;

/// A file wrapper with path
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
}

impl File {
    /// Create a new file reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File reference with the path made absolute against the working directory
    pub fn absolute(path: impl AsRef<Path>) -> Result<Self, DeployError> {
        let path = std::path::absolute(path.as_ref())?;
        Ok(Self::new(path))
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, or the whole path when there is none
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Check if the file exists
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Fail with `FileNotFound` unless the file exists
    pub async fn ensure_exists(&self) -> Result<(), DeployError> {
        if self.exists().await {
            Ok(())
        } else {
            Err(DeployError::FileNotFound(self.path.display().to_string()))
        }
    }

    /// Size in bytes
    pub async fn size(&self) -> Result<u64, DeployError> {
        Ok(fs::metadata(&self.path).await?.len())
    }

    /// Open the file for streaming
    pub async fn open(&self) -> Result<fs::File, DeployError> {
        match fs::File::open(&self.path).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DeployError::FileNotFound(self.path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read file contents as string
    pub async fn read_string(&self) -> Result<String, DeployError> {
        let mut file = self.open().await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;
        Ok(contents)
    }

    /// Read file as JSON
    pub async fn read_json<T: DeserializeOwned>(&self) -> Result<T, DeployError> {
        let contents = self.read_string().await?;
        let value = serde_json::from_str(&contents)?;
        Ok(value)
    }

    /// SHA-256 of the file contents as upper-case hex, read in chunks
    pub async fn sha256_digest(&self) -> Result<String, DeployError> {
        let mut file = self.open().await?;
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; DIGEST_CHUNK_SIZE];
        loop {
            let read = file.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
        }
        Ok(hex::encode(hasher.finalize()).to_uppercase())
    }
}
