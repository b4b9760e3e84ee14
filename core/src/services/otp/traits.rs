//! Traits for store and mail dispatch integration

use async_trait::async_trait;

use crate::domain::{StorageBackend, VerificationOutcome};
use crate::errors::OtpResult;

/// Persistence contract every OTP backend fulfils
///
/// Implementations keep at most one live record per identity, stamp records
/// with their own clock, and consume a record exactly once on success.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Store `code` for `identity`, replacing any previous record atomically
    async fn put(&self, identity: &str, code: &str) -> OtpResult<()>;

    /// Check `code` against the live record, deleting it when verified
    async fn verify(&self, identity: &str, code: &str) -> OtpResult<VerificationOutcome>;

    /// Drop the record for `identity`; `true` if one existed
    async fn remove(&self, identity: &str) -> OtpResult<bool>;

    /// Delete every expired record; returns how many were removed
    async fn purge_expired(&self) -> OtpResult<u64>;

    /// Kind of storage behind this store
    fn backend(&self) -> StorageBackend;
}

/// Mail delivery contract
#[async_trait]
pub trait MailDispatcher: Send + Sync {
    /// Send `code` to `recipient`
    async fn send_otp(&self, recipient: &str, code: &str) -> OtpResult<()>;
}
