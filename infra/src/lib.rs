//! # Infrastructure Layer
//!
//! Concrete implementations of the OTP store and mail dispatch contracts
//! defined in `eo_core`.
//!
//! ## Architecture
//!
//! - **Cache**: Redis (and an in-process map) behind [`cache::KeyValueCache`],
//!   wrapped by [`cache::CacheOtpStore`]
//! - **Database**: SQLite through an SQLx pool, [`database::SqliteOtpStore`]
//! - **Mail**: SMTP via lettre, plus a logging mailer for development
//! - **Backend**: selection of the configured store at startup

use eo_core::errors::OtpError;

pub mod backend;
pub mod cache;
pub mod database;
pub mod mail;

pub use backend::{AnyOtpStore, OtpBackend};
pub use cache::{CacheOtpStore, KeyValueCache, MemoryCache, RedisClient};
pub use database::{DatabasePool, SqliteOtpStore};
pub use mail::{LogMailer, SmtpMailer};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Mail transport or message construction error
    #[error("Mail error: {0}")]
    Mail(String),

    /// A stored record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl InfrastructureError {
    /// Map an error raised while opening a store
    pub fn into_connect_error(self) -> OtpError {
        match self {
            InfrastructureError::Config(message) => OtpError::Config { message },
            other => OtpError::StoreConnect {
                message: other.to_string(),
            },
        }
    }
}

impl From<InfrastructureError> for OtpError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Mail(message) => OtpError::Dispatch { message },
            InfrastructureError::Config(message) => OtpError::Config { message },
            other => OtpError::StoreOperation {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_errors_map_to_store_operation() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let otp: OtpError = InfrastructureError::Serialization(err).into();
        assert!(matches!(otp, OtpError::StoreOperation { .. }));
    }

    #[test]
    fn test_mail_errors_map_to_dispatch() {
        let otp: OtpError = InfrastructureError::Mail("relay denied".to_string()).into();
        match otp {
            OtpError::Dispatch { message } => assert_eq!(message, "relay denied"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_connect_errors() {
        let err = InfrastructureError::Database(sqlx::Error::PoolTimedOut).into_connect_error();
        assert!(matches!(err, OtpError::StoreConnect { .. }));

        let err = InfrastructureError::Config("bad url".to_string()).into_connect_error();
        assert!(matches!(err, OtpError::Config { .. }));
    }
}
