use anyhow::{Context, Result};
use std::process::ExitCode;
use std::sync::Arc;

use eo_core::services::{EmailOtpAuth, OtpServiceConfig};
use eo_infra::{LogMailer, OtpBackend};
use eo_shared::config::AppConfig;

pub async fn run(config: &AppConfig, email: &str, code: &str) -> Result<ExitCode> {
    config.validate_store().context("invalid configuration")?;

    let store = Arc::new(OtpBackend::connect(config).await?);
    // Verification never sends mail
    let auth = EmailOtpAuth::new(Arc::new(LogMailer::new()), store, OtpServiceConfig::from(&config.otp))?;

    let outcome = auth.verify_otp(email, code).await?;
    println!("{outcome}");

    Ok(if outcome.is_verified() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
