//! Configuration module with per-concern sub-modules
//!
//! - `cache` - Redis configuration for the keyed backend
//! - `database` - SQLite pool configuration for the relational backend
//! - `environment` - Environment detection and logging configuration
//! - `mail` - SMTP server, sender identity and message templates
//! - `otp` - Code length, expiry window, mismatch policy and backend choice

pub mod cache;
pub mod database;
pub mod environment;
pub mod mail;
pub mod otp;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::validation::{Validate, ValidationErrors};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig, ENV_VAR};
pub use mail::{MailServerConfig, SmtpSecurity, OTP_PLACEHOLDER};
pub use otp::{MismatchPolicy, OtpConfig, StoreKind};

/// Prefix of environment variables read by [`AppConfig::load`] (`EO_MAIL__HOST`)
pub const ENV_PREFIX: &str = "EO";

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// OTP lifecycle configuration
    #[serde(default)]
    pub otp: OtpConfig,

    /// Redis configuration (used when `otp.store = "redis"`)
    #[serde(default)]
    pub cache: CacheConfig,

    /// SQLite configuration (used when `otp.store = "sqlite"`)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Mail server configuration
    #[serde(default)]
    pub mail: MailServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let environment = Environment::default();
        Self {
            environment,
            otp: OtpConfig::default(),
            cache: CacheConfig::default(),
            database: DatabaseConfig::default(),
            mail: MailServerConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }
}

impl AppConfig {
    /// Build configuration from plain environment variables
    ///
    /// Reads `.env`, then the per-environment file such as
    /// `.env.production`, when present. Neither overrides variables that are
    /// already set. Unset variables fall back to defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let environment = Environment::from_env();
        dotenvy::from_filename(environment.env_file()).ok();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT").ok().and_then(|v| v.parse().ok()) {
            logging.format = format;
        }

        Self {
            environment,
            otp: OtpConfig::from_env(),
            cache: CacheConfig::from_env(),
            database: DatabaseConfig::from_env(),
            mail: MailServerConfig::from_env(),
            logging,
        }
    }

    /// Load layered configuration and validate it
    ///
    /// Layers, lowest precedence first: plain environment variables
    /// ([`AppConfig::from_env`]), the optional per-environment TOML file, and
    /// `EO_`-prefixed nested variables such as `EO_OTP__EXPIRY_SECONDS`.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::load_unchecked(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the layers without validating
    ///
    /// `file` overrides the per-environment TOML path. Callers that only
    /// touch the store validate with [`AppConfig::validate_store`].
    pub fn load_unchecked(file: Option<&Path>) -> Result<Self, ConfigError> {
        let base = Self::from_env();
        let default_file = base.environment.config_file().to_string();
        let file = file.unwrap_or_else(|| Path::new(&default_file)).to_path_buf();
        Self::layered(base, &file)
    }

    /// Same as [`AppConfig::load`] with an explicit base and file path
    pub fn load_layered(base: AppConfig, file: &Path) -> Result<Self, ConfigError> {
        let config = Self::layered(base, file)?;
        config.validate()?;
        Ok(config)
    }

    fn layered(base: AppConfig, file: &Path) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&base)?)
            .add_source(::config::File::from(file).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate the OTP policy and the selected backend, ignoring mail
    pub fn validate_store(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = self.otp.validate() {
            errors.merge_prefixed("otp", e);
        }
        match self.otp.store {
            StoreKind::Redis => {
                if let Err(e) = self.cache.validate() {
                    errors.merge_prefixed("cache", e);
                }
            }
            StoreKind::Sqlite => {
                if let Err(e) = self.database.validate() {
                    errors.merge_prefixed("database", e);
                }
            }
        }

        errors.into_result()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = self.validate_store() {
            errors.merge(e);
        }
        if let Err(e) = self.mail.validate() {
            errors.merge_prefixed("mail", e);
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LAYER_VARS: [&str; 3] = ["EO_MAIL__PASSWORD", "EO_MAIL__SENDER_NAME", "EO_OTP__EXPIRY_SECONDS"];

    fn valid_mail() -> MailServerConfig {
        MailServerConfig {
            host: "smtp.example.com".to_string(),
            email: "sender@example.com".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_requires_mail_credentials() {
        let errors = AppConfig::default().validate().unwrap_err();
        assert!(errors.has_field("mail.email"));
        assert!(errors.has_field("mail.password"));
    }

    #[test]
    fn test_validate_store_ignores_mail() {
        let mut config = AppConfig::default();
        assert!(config.validate_store().is_ok());

        config.otp.code_length = 2;
        let errors = config.validate_store().unwrap_err();
        assert!(errors.has_field("otp.code_length"));
        assert!(!errors.has_field("mail.email"));
    }

    #[test]
    fn test_only_selected_backend_validated() {
        let mut config = AppConfig {
            mail: valid_mail(),
            ..Default::default()
        };
        config.database.url = "postgres://nope".to_string();
        assert!(config.validate().is_ok());

        config.otp.store = StoreKind::Sqlite;
        let errors = config.validate().unwrap_err();
        assert!(errors.has_field("database.url"));
    }

    #[test]
    fn test_load_layered_reads_file() {
        temp_env::with_vars_unset(LAYER_VARS, load_layered_reads_file);
    }

    fn load_layered_reads_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("eo-config-test-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[otp]\nstore = \"sqlite\"\nexpiry_seconds = 120\n").unwrap();
        writeln!(file, "[database]\nurl = \"sqlite::memory:\"\nmax_connections = 1\nconnect_timeout = 5\n").unwrap();
        drop(file);

        let base = AppConfig {
            mail: valid_mail(),
            ..Default::default()
        };
        let config = AppConfig::load_layered(base, &path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.otp.store, StoreKind::Sqlite);
        assert_eq!(config.otp.expiry_seconds, 120);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.mail.host, "smtp.example.com");
    }

    #[test]
    fn test_load_layered_missing_file_is_fine() {
        temp_env::with_vars_unset(LAYER_VARS, || {
            let base = AppConfig {
                mail: valid_mail(),
                ..Default::default()
            };
            let config = AppConfig::load_layered(base.clone(), Path::new("does-not-exist.toml")).unwrap();
            assert_eq!(config, base);
        });
    }

    #[test]
    fn test_env_layer_keeps_string_values_verbatim() {
        temp_env::with_vars(
            [
                ("EO_MAIL__PASSWORD", Some("007")),
                ("EO_MAIL__SENDER_NAME", Some("1e3")),
                ("EO_OTP__EXPIRY_SECONDS", Some("120")),
            ],
            || {
                let config = AppConfig::layered(AppConfig::default(), Path::new("does-not-exist.toml")).unwrap();
                assert_eq!(config.mail.password, "007");
                assert_eq!(config.mail.sender_name, "1e3");
                assert_eq!(config.otp.expiry_seconds, 120);
            },
        );
    }

    #[test]
    fn test_load_layered_rejects_invalid() {
        let result = AppConfig::load_layered(AppConfig::default(), Path::new("does-not-exist.toml"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
