use anyhow::{Context, Result};
use std::process::ExitCode;

use eo_cli::{commands, dispatch, telemetry};
use eo_shared::config::AppConfig;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = commands::new().get_matches();
    let globals = dispatch::globals(&matches)?;
    let action = dispatch::handler(&matches)?;

    let config = AppConfig::load_unchecked(globals.config_file.as_deref())
        .context("failed to load configuration")?;
    let config = globals.apply(config);

    telemetry::init(&config.logging, globals.verbosity)?;

    action.execute(config).await
}
