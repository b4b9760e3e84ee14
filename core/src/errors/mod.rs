//! OTP error taxonomy.

use eo_shared::validation::ValidationErrors;
use thiserror::Error;

/// Errors raised while issuing or verifying one-time passcodes
#[derive(Error, Debug)]
pub enum OtpError {
    /// The mail transport rejected or failed to deliver the message
    #[error("Failed to dispatch OTP email: {message}")]
    Dispatch { message: String },

    /// The store could not be reached or opened
    #[error("Failed to connect to OTP store: {message}")]
    StoreConnect { message: String },

    /// A read or write against the store failed
    #[error("OTP store operation failed: {message}")]
    StoreOperation { message: String },

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("OTP expired")]
    ExpiredOtp,

    #[error("No OTP issued for this identity")]
    NotFound,

    /// Missing or malformed caller input
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl OtpError {
    /// Whether the error comes from a collaborator rather than the caller
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            OtpError::Dispatch { .. } | OtpError::StoreConnect { .. } | OtpError::StoreOperation { .. }
        )
    }
}

impl From<ValidationErrors> for OtpError {
    fn from(errors: ValidationErrors) -> Self {
        OtpError::Config {
            message: errors.to_string(),
        }
    }
}

pub type OtpResult<T> = Result<T, OtpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = OtpError::Dispatch {
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to dispatch OTP email: connection refused");
        assert_eq!(OtpError::ExpiredOtp.to_string(), "OTP expired");
    }

    #[test]
    fn test_infrastructure_classification() {
        assert!(OtpError::StoreConnect { message: String::new() }.is_infrastructure());
        assert!(OtpError::StoreOperation { message: String::new() }.is_infrastructure());
        assert!(!OtpError::InvalidOtp.is_infrastructure());
        assert!(!OtpError::InvalidRequest { message: String::new() }.is_infrastructure());
    }

    #[test]
    fn test_from_validation_errors() {
        let mut errors = ValidationErrors::new();
        errors.add_error("code_length", "must be between 4 and 10", "range");

        match OtpError::from(errors) {
            OtpError::Config { message } => assert!(message.contains("code_length")),
            other => panic!("Expected config error, got {:?}", other),
        }
    }
}
