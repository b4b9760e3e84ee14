//! Configuration for the OTP service

use eo_shared::config::otp::DEFAULT_CODE_LENGTH;
use eo_shared::config::OtpConfig;

/// Configuration for the OTP facade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpServiceConfig {
    /// Number of digits per generated code
    pub code_length: usize,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            code_length: config.code_length,
        }
    }
}
