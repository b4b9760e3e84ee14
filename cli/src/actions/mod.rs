//! Subcommand implementations

use anyhow::Result;
use std::process::ExitCode;
use std::time::Duration;

use eo_shared::config::AppConfig;

mod init_db;
mod purge;
mod request;
mod verify;

/// What the command line asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Request { email: String, log_only: bool },
    Verify { email: String, code: String },
    Purge { watch: bool, interval: Option<Duration> },
    InitDb,
}

impl Action {
    /// Run the action against the given configuration
    pub async fn execute(self, config: AppConfig) -> Result<ExitCode> {
        match self {
            Action::Request { email, log_only } => request::run(&config, &email, log_only).await,
            Action::Verify { email, code } => verify::run(&config, &email, &code).await,
            Action::Purge { watch, interval } => purge::run(&config, watch, interval).await,
            Action::InitDb => init_db::run(&config).await,
        }
    }
}
