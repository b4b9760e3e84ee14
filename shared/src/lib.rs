//! Shared configuration and utilities for the email OTP workspace
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types (cache, database, mail, OTP policy, logging)
//! - Validation helpers for configuration structures
//! - Email address normalization and masking for logs

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, DatabaseConfig, Environment, LogFormat, LoggingConfig,
    MailServerConfig, MismatchPolicy, OtpConfig, SmtpSecurity, StoreKind,
};
pub use utils::{email, validation};
