//! Settings file management

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::http::client::Timeouts;
use crate::logs::LogLevel;

/// Deployer settings
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Deploy service configuration
    #[serde(default)]
    pub backend: BackendSettings,

    /// Org and space the MTA is deployed to
    #[serde(default)]
    pub target: TargetSettings,

    /// Process monitoring configuration
    #[serde(default)]
    pub monitor: MonitorSettings,
}

impl Settings {
    /// Load settings, falling back to defaults when the file does not exist
    pub async fn load(file: &File) -> Result<Self, DeployError> {
        if !file.exists().await {
            debug!("No settings file at {}, using defaults", file.path().display());
            return Ok(Self::default());
        }
        file.read_json::<Settings>().await.map_err(|e| {
            DeployError::ConfigError(format!(
                "Unable to read settings file {}: {}",
                file.path().display(),
                e
            ))
        })
    }
}

/// Deploy service API settings
#[derive(Debug, Deserialize)]
pub struct BackendSettings {
    /// Base URL for the deploy service API
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Bearer token sent with every request
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Seconds allowed for establishing a connection
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Seconds a single read may wait for data. Long uploads are fine as
    /// long as the connection keeps making progress.
    #[serde(default = "default_read_timeout", alias = "request_timeout_secs")]
    pub read_timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8080/api/v1".to_string()
}

const fn default_connect_timeout() -> u64 {
    30
}

const fn default_read_timeout() -> u64 {
    300
}

impl BackendSettings {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            read: Duration::from_secs(self.read_timeout_secs),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            token: None,
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

/// Deployment target
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TargetSettings {
    #[serde(default)]
    pub org: String,

    #[serde(default)]
    pub space: String,

    /// Space identifier used to scope operations
    #[serde(default)]
    pub space_guid: String,

    #[serde(default)]
    pub user: String,
}

/// Process monitoring settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonitorSettings {
    /// Delay between two polls in seconds
    #[serde(default = "default_polling_interval")]
    pub polling_interval_secs: u64,

    /// Give up monitoring after this many seconds. Unset means wait forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_polling_interval() -> u64 {
    5
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            polling_interval_secs: default_polling_interval(),
            timeout_secs: None,
        }
    }
}
