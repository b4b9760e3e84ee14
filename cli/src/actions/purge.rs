use anyhow::{Context, Result};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use eo_core::services::PurgeService;
use eo_infra::OtpBackend;
use eo_shared::config::AppConfig;

pub async fn run(config: &AppConfig, watch: bool, interval: Option<Duration>) -> Result<ExitCode> {
    config.validate_store().context("invalid configuration")?;

    let store = Arc::new(OtpBackend::connect(config).await?);
    let service = PurgeService::new(store);

    if !watch {
        let removed = service.run_once().await?;
        println!("Removed {removed} expired code(s)");
        return Ok(ExitCode::SUCCESS);
    }

    let every = interval
        .or_else(|| config.otp.purge_interval_seconds.map(Duration::from_secs))
        .context("--watch needs --interval or otp.purge_interval_seconds")?;

    let handle = service.spawn(every);
    tokio::signal::ctrl_c().await?;
    info!("Interrupted, stopping purge");
    handle.stop().await;

    Ok(ExitCode::SUCCESS)
}
