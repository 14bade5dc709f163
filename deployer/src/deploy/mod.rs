//! Deployment pipeline

pub mod archive;
pub mod command;
pub mod conflicts;
pub mod dispatcher;
pub mod launcher;
pub mod monitor;
pub mod uploader;

pub use command::{DeployCommand, DeployRequest, LaunchRequest, SERVICE_ID};
