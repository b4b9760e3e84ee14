//! The stored OTP record and the rules for judging a presented code.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;

use eo_shared::config::{MismatchPolicy, OtpConfig};
use eo_shared::config::otp::{DEFAULT_EXPIRY_SECONDS, MAX_EXPIRY_SECONDS};

use super::outcome::VerificationOutcome;
use crate::errors::{OtpError, OtpResult};

/// One live passcode for one identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    /// Storage key, a normalized email address
    pub identity: String,

    /// The issued digits
    pub code: String,

    /// When the code was stored
    pub issued_at: DateTime<Utc>,
}

/// Expiry window and mismatch handling shared by every store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub window: Duration,
    pub mismatch: MismatchPolicy,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            window: Duration::seconds(DEFAULT_EXPIRY_SECONDS as i64),
            mismatch: MismatchPolicy::default(),
        }
    }
}

impl ExpiryPolicy {
    pub fn new(window: Duration, mismatch: MismatchPolicy) -> Self {
        Self { window, mismatch }
    }

    /// Build the policy from configuration
    ///
    /// # Errors
    ///
    /// `OtpError::Config` when the window is zero or longer than
    /// `MAX_EXPIRY_SECONDS`.
    pub fn from_config(config: &OtpConfig) -> OtpResult<Self> {
        let window = Some(config.expiry_seconds)
            .filter(|secs| (1..=MAX_EXPIRY_SECONDS).contains(secs))
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .ok_or_else(|| OtpError::Config {
                message: format!(
                    "expiry_seconds must be between 1 and {}, got {}",
                    MAX_EXPIRY_SECONDS, config.expiry_seconds
                ),
            })?;

        Ok(Self {
            window,
            mismatch: config.mismatch_policy,
        })
    }

    /// Issue time before which records are expired as of `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether a mismatch should delete the record
    pub fn invalidates_on_mismatch(&self) -> bool {
        self.mismatch == MismatchPolicy::Invalidate
    }
}

impl OtpRecord {
    pub fn new(identity: impl Into<String>, code: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            identity: identity.into(),
            code: code.into(),
            issued_at,
        }
    }

    pub fn expires_at(&self, policy: &ExpiryPolicy) -> DateTime<Utc> {
        self.issued_at
            .checked_add_signed(policy.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Expired once strictly more than the window has elapsed
    pub fn is_expired_at(&self, now: DateTime<Utc>, policy: &ExpiryPolicy) -> bool {
        now - self.issued_at > policy.window
    }

    /// Constant-time comparison against a presented code
    pub fn matches(&self, code: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), code.as_bytes())
    }

    /// Judge a presented code against this record
    ///
    /// Expiry wins over a matching code. `Verified` here means the code is
    /// acceptable; the caller still has to consume the record.
    pub fn evaluate(&self, code: &str, now: DateTime<Utc>, policy: &ExpiryPolicy) -> VerificationOutcome {
        if self.is_expired_at(now, policy) {
            VerificationOutcome::Expired
        } else if self.matches(code) {
            VerificationOutcome::Verified
        } else {
            VerificationOutcome::Mismatch
        }
    }
}
