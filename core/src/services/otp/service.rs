//! Auth facade: generate → persist → notify, and verify

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use eo_shared::email::{is_valid_email, mask_email, normalize_email};

use crate::domain::{OtpGenerator, VerificationOutcome};
use crate::errors::{OtpError, OtpResult};

use super::config::OtpServiceConfig;
use super::traits::{MailDispatcher, OtpStore};

/// Issues and verifies email one-time passcodes
///
/// The three steps of [`EmailOtpAuth::generate_otp`] are not atomic as a
/// whole. The code is persisted before the email goes out, so a dispatch
/// failure leaves a usable code behind while a store failure sends nothing.
pub struct EmailOtpAuth<M: MailDispatcher, S: OtpStore> {
    /// Mail transport for delivering codes
    mailer: Arc<M>,
    /// Backend holding the live codes
    store: Arc<S>,
    /// Code generator
    generator: OtpGenerator,
}

impl<M: MailDispatcher, S: OtpStore> EmailOtpAuth<M, S> {
    /// Create a new facade
    ///
    /// # Errors
    ///
    /// `OtpError::Config` when the configured code length is unsupported.
    pub fn new(mailer: Arc<M>, store: Arc<S>, config: OtpServiceConfig) -> OtpResult<Self> {
        let generator = OtpGenerator::new(config.code_length)?;
        Ok(Self {
            mailer,
            store,
            generator,
        })
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Generate a code for `identity`, store it and email it
    ///
    /// Any earlier code for the same identity stops being valid.
    ///
    /// # Errors
    ///
    /// * `InvalidRequest` - `identity` is not an email address
    /// * `StoreConnect` / `StoreOperation` - the code could not be stored; no email was sent
    /// * `Dispatch` - the code is stored but the email could not be sent
    pub async fn generate_otp(&self, identity: &str) -> OtpResult<()> {
        let identity = Self::normalize_identity(identity)?;
        let masked = mask_email(&identity);
        let code = self.generator.generate();

        self.store.put(&identity, &code).await.map_err(|e| {
            error!(
                identity = %masked,
                backend = %self.store.backend(),
                error = %e,
                event = "otp_storage_failed",
                "Failed to store OTP"
            );
            e
        })?;

        debug!(
            identity = %masked,
            backend = %self.store.backend(),
            event = "otp_stored",
            "Stored new OTP"
        );

        if let Err(e) = self.mailer.send_otp(&identity, &code).await {
            warn!(
                identity = %masked,
                error = %e,
                event = "otp_dispatch_failed",
                "OTP stored but email dispatch failed"
            );
            return Err(e);
        }

        info!(identity = %masked, event = "otp_sent", "OTP generated and sent");
        Ok(())
    }

    /// Check `code` for `identity`
    ///
    /// A `Verified` outcome consumes the code.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for an empty identity or code, store errors otherwise.
    /// Wrong, expired and unknown codes are outcomes, not errors.
    pub async fn verify_otp(&self, identity: &str, code: &str) -> OtpResult<VerificationOutcome> {
        let identity = Self::normalize_identity(identity)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(OtpError::InvalidRequest {
                message: "code must not be empty".to_string(),
            });
        }

        let masked = mask_email(&identity);
        if !self.generator.is_well_formed(code) {
            debug!(identity = %masked, "Presented code is malformed");
        }

        let outcome = self.store.verify(&identity, code).await?;

        match outcome {
            VerificationOutcome::Verified => {
                info!(identity = %masked, event = "otp_verified", "OTP verified");
            }
            other => {
                warn!(
                    identity = %masked,
                    outcome = %other,
                    event = "otp_rejected",
                    "OTP verification failed"
                );
            }
        }

        Ok(outcome)
    }

    /// Boolean form of [`EmailOtpAuth::verify_otp`]
    pub async fn is_valid_otp(&self, identity: &str, code: &str) -> OtpResult<bool> {
        Ok(self.verify_otp(identity, code).await?.is_verified())
    }

    /// Error form of [`EmailOtpAuth::verify_otp`]
    ///
    /// Mismatch, expiry and unknown identities become `InvalidOtp`,
    /// `ExpiredOtp` and `NotFound`.
    pub async fn verify_otp_strict(&self, identity: &str, code: &str) -> OtpResult<()> {
        self.verify_otp(identity, code).await?.into_result()
    }

    /// Withdraw any live code for `identity`
    pub async fn revoke_otp(&self, identity: &str) -> OtpResult<bool> {
        let identity = Self::normalize_identity(identity)?;
        self.store.remove(&identity).await
    }

    fn normalize_identity(identity: &str) -> OtpResult<String> {
        if identity.trim().is_empty() {
            return Err(OtpError::InvalidRequest {
                message: "identity must not be empty".to_string(),
            });
        }
        if !is_valid_email(identity) {
            return Err(OtpError::InvalidRequest {
                message: format!("invalid email address: {}", mask_email(identity.trim())),
            });
        }
        Ok(normalize_email(identity))
    }
}
