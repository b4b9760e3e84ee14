//! Numeric one-time passcode generation.

use rand::{rngs::OsRng, Rng};

use eo_shared::config::otp::{DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH, MIN_CODE_LENGTH};

use crate::errors::{OtpError, OtpResult};

/// Generates fixed-length, digits-only passcodes from the OS CSPRNG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpGenerator {
    length: usize,
}

impl Default for OtpGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
        }
    }
}

impl OtpGenerator {
    /// Create a generator for `length` digits
    ///
    /// # Errors
    ///
    /// `OtpError::Config` when `length` is outside the supported range.
    pub fn new(length: usize) -> OtpResult<Self> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
            return Err(OtpError::Config {
                message: format!(
                    "code length must be between {} and {}, got {}",
                    MIN_CODE_LENGTH, MAX_CODE_LENGTH, length
                ),
            });
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate a new code
    ///
    /// Each digit is drawn independently and uniformly, so leading zeros are
    /// as likely as any other digit and the result is always `length` chars.
    pub fn generate(&self) -> String {
        let mut rng = OsRng;
        (0..self.length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    /// Whether `code` has the shape this generator produces
    pub fn is_well_formed(&self, code: &str) -> bool {
        code.len() == self.length && code.bytes().all(|b| b.is_ascii_digit())
    }
}
