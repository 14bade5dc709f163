//! MTA deployer - Entry Point
//!
//! Deploys a multi-target app archive and monitors the deploy process, or
//! aborts, retries or resumes an existing one.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use mtadeploy::app::cli::Cli;
use mtadeploy::app::run::run;
use mtadeploy::terminal::Terminal;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut terminal = Terminal::stdout();

    match run(cli, &mut terminal).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Deployment failed: {e}");
            let _ = terminal.failure(&e);
            if e.is_usage() {
                let _ = terminal.say("See 'mtadeploy --help'.");
            }
            ExitCode::FAILURE
        }
    }
}
