use anyhow::{Context, Result};
use std::process::ExitCode;
use std::sync::Arc;

use eo_core::services::{EmailOtpAuth, MailDispatcher, OtpServiceConfig, OtpStore};
use eo_infra::{LogMailer, OtpBackend, SmtpMailer};
use eo_shared::config::AppConfig;
use eo_shared::email::{mask_email, normalize_email};
use eo_shared::validation::Validate;

pub async fn run(config: &AppConfig, email: &str, log_only: bool) -> Result<ExitCode> {
    if log_only {
        config.validate_store().context("invalid configuration")?;
    } else {
        config.validate().context("invalid configuration")?;
    }

    let store = Arc::new(OtpBackend::connect(config).await?);

    if log_only {
        issue(Arc::new(log_mailer(config)), store, config, email).await
    } else {
        let mailer = SmtpMailer::new(config.mail.clone())?;
        issue(Arc::new(mailer), store, config, email).await
    }
}

/// Log-only dispatch shows the code everywhere but production
fn log_mailer(config: &AppConfig) -> LogMailer {
    if config.environment.is_production() {
        LogMailer::new()
    } else {
        LogMailer::revealing()
    }
}

async fn issue<M: MailDispatcher, S: OtpStore>(
    mailer: Arc<M>,
    store: Arc<S>,
    config: &AppConfig,
    email: &str,
) -> Result<ExitCode> {
    let auth = EmailOtpAuth::new(mailer, store, OtpServiceConfig::from(&config.otp))?;
    auth.generate_otp(email).await?;

    println!("Code sent to {}", mask_email(&normalize_email(email)));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eo_shared::config::Environment;

    #[test]
    fn test_log_mailer_hides_codes_in_production() {
        let mut config = AppConfig::default();
        assert!(log_mailer(&config).reveals_codes());

        config.environment = Environment::Production;
        assert!(!log_mailer(&config).reveals_codes());
    }
}
