//! Verification outcomes and backend identification.

use std::fmt;

use crate::errors::{OtpError, OtpResult};

/// Result of checking a presented code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Code matched a live record; the record has been consumed
    Verified,
    /// A live record exists but holds a different code
    Mismatch,
    /// A record exists but its window has elapsed
    Expired,
    /// No record: never issued, already consumed, or removed
    NotFound,
}

impl VerificationOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationOutcome::Verified => "verified",
            VerificationOutcome::Mismatch => "mismatch",
            VerificationOutcome::Expired => "expired",
            VerificationOutcome::NotFound => "not_found",
        }
    }

    /// Turn every non-verified outcome into its error
    pub fn into_result(self) -> OtpResult<()> {
        match self {
            VerificationOutcome::Verified => Ok(()),
            VerificationOutcome::Mismatch => Err(OtpError::InvalidOtp),
            VerificationOutcome::Expired => Err(OtpError::ExpiredOtp),
            VerificationOutcome::NotFound => Err(OtpError::NotFound),
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of store holds the records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Keyed cache (Redis or the in-process cache)
    Cache,
    /// Single-table relational store (SQLite)
    Relational,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Cache => write!(f, "cache"),
            StorageBackend::Relational => write!(f, "relational"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_verified_is_verified() {
        assert!(VerificationOutcome::Verified.is_verified());
        assert!(!VerificationOutcome::Mismatch.is_verified());
        assert!(!VerificationOutcome::Expired.is_verified());
        assert!(!VerificationOutcome::NotFound.is_verified());
    }

    #[test]
    fn test_into_result() {
        assert!(VerificationOutcome::Verified.into_result().is_ok());
        assert!(matches!(VerificationOutcome::Mismatch.into_result(), Err(OtpError::InvalidOtp)));
        assert!(matches!(VerificationOutcome::Expired.into_result(), Err(OtpError::ExpiredOtp)));
        assert!(matches!(VerificationOutcome::NotFound.into_result(), Err(OtpError::NotFound)));
    }

    #[test]
    fn test_display() {
        assert_eq!(VerificationOutcome::NotFound.to_string(), "not_found");
        assert_eq!(StorageBackend::Relational.to_string(), "relational");
    }
}
