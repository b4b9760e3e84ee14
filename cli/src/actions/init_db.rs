use anyhow::{bail, Context, Result};
use std::process::ExitCode;
use std::sync::Arc;

use eo_core::domain::{ExpiryPolicy, SystemClock};
use eo_infra::database::{DatabasePool, SqliteOtpStore};
use eo_shared::config::AppConfig;
use eo_shared::validation::Validate;

pub async fn run(config: &AppConfig) -> Result<ExitCode> {
    config.database.validate().context("invalid database configuration")?;

    let pool = DatabasePool::new(&config.database).await?;
    // Construction bootstraps the table
    SqliteOtpStore::new(pool.clone(), Arc::new(SystemClock), ExpiryPolicy::from_config(&config.otp)?).await?;

    if !pool.health_check().await? {
        pool.close().await;
        bail!("database at {} failed its health check", config.database.url);
    }
    let stats = pool.get_statistics();
    pool.close().await;

    println!("otp_codes table ready at {} ({})", config.database.url, stats);
    Ok(ExitCode::SUCCESS)
}
