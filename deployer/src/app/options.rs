//! Deployment options

use std::time::Duration;

use crate::deploy::monitor;
use crate::models::{OperationParameters, VersionRule};
use crate::storage::settings::{MonitorSettings, TargetSettings};

/// Flags controlling a new deployment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Abort conflicting operations before deploying
    pub force: bool,

    /// Delete services no longer part of the MTA
    pub delete_services: bool,

    /// Keep uploaded files after the process ends
    pub keep_files: bool,

    /// Do not start apps after deploying them
    pub no_start: bool,

    /// Fail when an app crashes during start
    pub fail_on_crashed: bool,

    /// Continue when the user lacks permissions on some resources
    pub ignore_missing_permissions: bool,

    pub version_rule: VersionRule,
}

impl DeployOptions {
    /// Process parameters for deploying to `target`.
    ///
    /// File ids are added once the artifacts are uploaded.
    pub fn to_parameters(&self, target: &TargetSettings) -> OperationParameters {
        OperationParameters::new()
            .with("targetPlatform", format!("{} {}", target.org, target.space))
            .with_flag("failOnCrashed", self.fail_on_crashed)
            .with_flag("deleteServices", self.delete_services)
            .with_flag("keepFiles", self.keep_files)
            .with_flag("noStart", self.no_start)
            .with_flag(
                "doNotFailOnMissingPermissions",
                self.ignore_missing_permissions,
            )
            .with("versionRule", self.version_rule.as_str())
    }
}

/// Shortest delay between two polls
const MIN_POLLING_INTERVAL_SECS: u64 = 1;

impl From<&MonitorSettings> for monitor::Options {
    fn from(settings: &MonitorSettings) -> Self {
        monitor::Options {
            interval: Duration::from_secs(
                settings.polling_interval_secs.max(MIN_POLLING_INTERVAL_SECS),
            ),
            timeout: settings.timeout_secs.map(Duration::from_secs),
            ..Default::default()
        }
    }
}
