//! Mailer that only logs

use async_trait::async_trait;
use tracing::info;

use eo_core::errors::OtpResult;
use eo_core::services::MailDispatcher;
use eo_shared::email::mask_email;

/// Logs each dispatch instead of sending mail
///
/// Codes are left out of the log unless built with [`LogMailer::revealing`].
#[derive(Debug, Clone, Default)]
pub struct LogMailer {
    reveal_codes: bool,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the code in the log line; local development only
    pub fn revealing() -> Self {
        Self { reveal_codes: true }
    }

    pub fn reveals_codes(&self) -> bool {
        self.reveal_codes
    }
}

#[async_trait]
impl MailDispatcher for LogMailer {
    async fn send_otp(&self, recipient: &str, code: &str) -> OtpResult<()> {
        if self.reveal_codes {
            info!(recipient = %mask_email(recipient), code, "OTP email (not sent)");
        } else {
            info!(recipient = %mask_email(recipient), "OTP email (not sent)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_never_fails() {
        assert!(LogMailer::new().send_otp("a@x.com", "123456").await.is_ok());
        assert!(LogMailer::revealing().send_otp("a@x.com", "123456").await.is_ok());
    }
}
