//! OTP lifecycle configuration module

use serde::{Deserialize, Serialize};

use crate::utils::validation::{Validate, ValidationErrors};

/// Default code length in digits
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default expiry window in seconds (5 minutes)
pub const DEFAULT_EXPIRY_SECONDS: u64 = 300;

/// Longest accepted expiry window in seconds (one day)
pub const MAX_EXPIRY_SECONDS: u64 = 86_400;

/// Smallest and largest accepted code lengths
pub const MIN_CODE_LENGTH: usize = 4;
pub const MAX_CODE_LENGTH: usize = 10;

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Keyed cache (Redis)
    #[default]
    Redis,
    /// Single-table relational store (SQLite)
    Sqlite,
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" | "cache" => Ok(StoreKind::Redis),
            "sqlite" | "relational" => Ok(StoreKind::Sqlite),
            _ => Err(format!("Invalid OTP store: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Redis => write!(f, "redis"),
            StoreKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// What a wrong code does to the live record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Keep the record; a later correct attempt inside the window still verifies
    #[default]
    Retain,
    /// Delete the record; the user must request a new code
    Invalidate,
}

impl std::str::FromStr for MismatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "retain" | "keep" => Ok(MismatchPolicy::Retain),
            "invalidate" | "delete" => Ok(MismatchPolicy::Invalidate),
            _ => Err(format!("Invalid mismatch policy: {}", s)),
        }
    }
}

/// OTP lifecycle configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Which backend stores the codes
    #[serde(default)]
    pub store: StoreKind,

    /// Number of digits per code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Seconds a code stays valid after issue
    #[serde(default = "default_expiry_seconds")]
    pub expiry_seconds: u64,

    /// Behaviour on a wrong code
    #[serde(default)]
    pub mismatch_policy: MismatchPolicy,

    /// Interval of the optional expired-record purge; `None` disables it
    #[serde(default)]
    pub purge_interval_seconds: Option<u64>,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            code_length: DEFAULT_CODE_LENGTH,
            expiry_seconds: DEFAULT_EXPIRY_SECONDS,
            mismatch_policy: MismatchPolicy::default(),
            purge_interval_seconds: None,
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store: parse_env("OTP_STORE").unwrap_or(defaults.store),
            code_length: parse_env("OTP_CODE_LENGTH").unwrap_or(defaults.code_length),
            expiry_seconds: parse_env("OTP_EXPIRY_SECONDS").unwrap_or(defaults.expiry_seconds),
            mismatch_policy: parse_env("OTP_MISMATCH_POLICY").unwrap_or(defaults.mismatch_policy),
            purge_interval_seconds: parse_env("OTP_PURGE_INTERVAL_SECONDS"),
        }
    }
}

impl Validate for OtpConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.code_length) {
            errors.add_error(
                "code_length",
                format!("must be between {} and {}", MIN_CODE_LENGTH, MAX_CODE_LENGTH),
                "range",
            );
        }
        if self.expiry_seconds == 0 || self.expiry_seconds > MAX_EXPIRY_SECONDS {
            errors.add_error(
                "expiry_seconds",
                format!("must be between 1 and {}", MAX_EXPIRY_SECONDS),
                "range",
            );
        }
        if self.purge_interval_seconds == Some(0) {
            errors.add_error("purge_interval_seconds", "must be greater than zero", "range");
        }
        errors.into_result()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_expiry_seconds() -> u64 {
    DEFAULT_EXPIRY_SECONDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_config_default() {
        let config = OtpConfig::default();
        assert_eq!(config.store, StoreKind::Redis);
        assert_eq!(config.code_length, 6);
        assert_eq!(config.expiry_seconds, 300);
        assert_eq!(config.mismatch_policy, MismatchPolicy::Retain);
        assert_eq!(config.purge_interval_seconds, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_otp_config_validation() {
        let config = OtpConfig {
            code_length: 3,
            expiry_seconds: 0,
            purge_interval_seconds: Some(0),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.has_field("code_length"));
        assert!(errors.has_field("expiry_seconds"));
        assert!(errors.has_field("purge_interval_seconds"));
    }

    #[test]
    fn test_expiry_window_upper_bound() {
        let mut config = OtpConfig {
            expiry_seconds: MAX_EXPIRY_SECONDS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.expiry_seconds = MAX_EXPIRY_SECONDS + 1;
        assert!(config.validate().unwrap_err().has_field("expiry_seconds"));

        config.expiry_seconds = 10_000_000_000_000_000;
        assert!(config.validate().unwrap_err().has_field("expiry_seconds"));
    }

    #[test]
    fn test_enums_from_str() {
        assert_eq!("sqlite".parse::<StoreKind>().unwrap(), StoreKind::Sqlite);
        assert_eq!("Redis".parse::<StoreKind>().unwrap(), StoreKind::Redis);
        assert!("mysql".parse::<StoreKind>().is_err());
        assert_eq!("invalidate".parse::<MismatchPolicy>().unwrap(), MismatchPolicy::Invalidate);
        assert!("sometimes".parse::<MismatchPolicy>().is_err());
    }

    #[test]
    fn test_otp_config_from_env() {
        temp_env::with_vars(
            [
                ("OTP_STORE", Some("sqlite")),
                ("OTP_CODE_LENGTH", Some("8")),
                ("OTP_EXPIRY_SECONDS", None),
                ("OTP_MISMATCH_POLICY", Some("invalidate")),
                ("OTP_PURGE_INTERVAL_SECONDS", Some("60")),
            ],
            || {
                let config = OtpConfig::from_env();
                assert_eq!(config.store, StoreKind::Sqlite);
                assert_eq!(config.code_length, 8);
                assert_eq!(config.expiry_seconds, 300);
                assert_eq!(config.mismatch_policy, MismatchPolicy::Invalidate);
                assert_eq!(config.purge_interval_seconds, Some(60));
            },
        );
    }
}
