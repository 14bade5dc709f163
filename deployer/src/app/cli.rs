//! Command line interface

use std::path::PathBuf;

use clap::Parser;

use crate::app::options::DeployOptions;
use crate::deploy::{DeployRequest, LaunchRequest};
use crate::errors::DeployError;
use crate::logs::LogLevel;
use crate::models::VersionRule;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

/// Deploy a multi-target app archive, or act on a running deployment
#[derive(Debug, Parser)]
#[command(name = "mtadeploy", version, long_version = LONG_VERSION)]
pub struct Cli {
    /// Path to the multi-target app archive
    #[arg(value_name = "MTA")]
    pub mta: Option<PathBuf>,

    /// Extension descriptor applied on top of the archive
    #[arg(short = 'e', value_name = "EXT_DESCRIPTOR")]
    pub extension_descriptor: Option<PathBuf>,

    /// Abort ongoing operations for the same MTA before deploying
    #[arg(short = 'f')]
    pub force: bool,

    /// Delete services that are no longer part of the MTA
    #[arg(long)]
    pub delete_services: bool,

    /// Keep uploaded files after the deployment ends
    #[arg(long)]
    pub keep_files: bool,

    /// Do not start apps
    #[arg(long)]
    pub no_start: bool,

    /// Fail the deployment when an app crashes
    #[arg(long)]
    pub fail_on_crashed: bool,

    /// Do not fail when permissions on some resources are missing
    #[arg(long)]
    pub do_not_fail_on_missing_permissions: bool,

    /// Which versions may replace the deployed MTA: HIGHER, SAME_HIGHER or ALL
    #[arg(long, value_name = "RULE")]
    pub version_rule: Option<VersionRule>,

    /// Id of an existing operation, used with -a
    #[arg(short = 'i', value_name = "OPERATION_ID")]
    pub operation_id: Option<String>,

    /// Action on the operation given with -i: abort, retry or resume
    #[arg(short = 'a', value_name = "ACTION")]
    pub action: Option<String>,

    /// Settings file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level for diagnostics on stderr
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl Cli {
    /// Turn the parsed arguments into a request.
    ///
    /// An operation id and an action select the action path and take
    /// precedence over an archive. Nothing here talks to the deploy service.
    pub fn to_request(&self) -> Result<DeployRequest, DeployError> {
        match (&self.operation_id, &self.action) {
            (Some(operation_id), Some(action)) => Ok(DeployRequest::Act {
                operation_id: operation_id.clone(),
                action: action.clone(),
            }),
            (None, None) => {
                let archive = self.mta.clone().ok_or_else(|| {
                    DeployError::Usage("Missing positional argument 'MTA'.".to_string())
                })?;
                Ok(DeployRequest::Launch(LaunchRequest {
                    archive,
                    extension_descriptor: self.extension_descriptor.clone(),
                    options: self.deploy_options(),
                }))
            }
            _ => Err(DeployError::Usage(
                "All the a i options should be specified together".to_string(),
            )),
        }
    }

    fn deploy_options(&self) -> DeployOptions {
        DeployOptions {
            force: self.force,
            delete_services: self.delete_services,
            keep_files: self.keep_files,
            no_start: self.no_start,
            fail_on_crashed: self.fail_on_crashed,
            ignore_missing_permissions: self.do_not_fail_on_missing_permissions,
            version_rule: self.version_rule.unwrap_or_default(),
        }
    }
}
