//! Application entry

use tracing::{debug, info};

use crate::app::cli::Cli;
use crate::deploy::monitor;
use crate::deploy::DeployCommand;
use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::http::client::HttpClient;
use crate::logs::{init_logging, LogOptions};
use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;
use crate::terminal::Terminal;
use crate::utils::version_info;

/// Run one deployer invocation
pub async fn run(cli: Cli, terminal: &mut Terminal) -> Result<(), DeployError> {
    let request = cli.to_request()?;

    let settings_file = match &cli.config {
        Some(path) => File::new(path),
        None => StorageLayout::default().settings_file(),
    };
    let settings = Settings::load(&settings_file).await?;

    let log_options = LogOptions {
        log_level: cli.log_level.unwrap_or(settings.log_level),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }
    info!("mtadeploy {}", version_info());
    debug!("Settings loaded from {}", settings_file.path().display());

    let client = HttpClient::new(
        &settings.backend.base_url,
        settings.backend.token.clone(),
        settings.backend.timeouts(),
    )?;
    let monitor_options = monitor::Options::from(&settings.monitor);

    DeployCommand::new(&client, settings.target.clone(), monitor_options)
        .execute(request, terminal)
        .await
}
