//! Relational OTP store on SQLite
//!
//! One row per identity in `otp_codes`, with `issued_at` kept as Unix
//! milliseconds. Re-issuing a code overwrites the row in a single upsert.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::Row;
use std::sync::Arc;
use tracing::{debug, error, info};

use eo_core::domain::{Clock, ExpiryPolicy, OtpRecord, StorageBackend, VerificationOutcome};
use eo_core::errors::{OtpError, OtpResult};
use eo_core::services::OtpStore;
use eo_shared::email::mask_email;

use super::DatabasePool;
use crate::InfrastructureError;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS otp_codes (
        id INTEGER PRIMARY KEY,
        identity TEXT NOT NULL UNIQUE,
        code TEXT NOT NULL,
        issued_at INTEGER NOT NULL
    )
"#;

const UPSERT: &str = r#"
    INSERT INTO otp_codes (identity, code, issued_at)
    VALUES (?, ?, ?)
    ON CONFLICT(identity) DO UPDATE SET
        code = excluded.code,
        issued_at = excluded.issued_at
"#;

/// [`OtpStore`] backed by an SQLite table
pub struct SqliteOtpStore {
    pool: DatabasePool,
    clock: Arc<dyn Clock>,
    policy: ExpiryPolicy,
}

impl SqliteOtpStore {
    /// Create the store, making sure the table exists
    pub async fn new(pool: DatabasePool, clock: Arc<dyn Clock>, policy: ExpiryPolicy) -> OtpResult<Self> {
        let store = Self { pool, clock, policy };
        store.bootstrap().await?;
        Ok(store)
    }

    /// Create the `otp_codes` table if it is missing; safe to repeat
    pub async fn bootstrap(&self) -> OtpResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(self.pool.get_pool())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create otp_codes table");
                InfrastructureError::Database(e).into_connect_error()
            })?;

        info!("otp_codes table ready");
        Ok(())
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    async fn find(&self, identity: &str) -> OtpResult<Option<OtpRecord>> {
        let row = sqlx::query("SELECT code, issued_at FROM otp_codes WHERE identity = ?")
            .bind(identity)
            .fetch_optional(self.pool.get_pool())
            .await
            .map_err(InfrastructureError::from)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let code: String = row.try_get("code").map_err(InfrastructureError::from)?;
        let issued_ms: i64 = row.try_get("issued_at").map_err(InfrastructureError::from)?;
        let issued_at = from_millis(issued_ms).ok_or_else(|| OtpError::StoreOperation {
            message: format!("invalid issued_at value {issued_ms}"),
        })?;

        Ok(Some(OtpRecord::new(identity, code, issued_at)))
    }

    /// Delete the row only if it still holds the judged record
    async fn consume(&self, record: &OtpRecord) -> OtpResult<bool> {
        let result = sqlx::query(
            "DELETE FROM otp_codes WHERE identity = ? AND code = ? AND issued_at = ?",
        )
        .bind(&record.identity)
        .bind(&record.code)
        .bind(record.issued_at.timestamp_millis())
        .execute(self.pool.get_pool())
        .await
        .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() == 1)
    }
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

#[async_trait]
impl OtpStore for SqliteOtpStore {
    async fn put(&self, identity: &str, code: &str) -> OtpResult<()> {
        sqlx::query(UPSERT)
            .bind(identity)
            .bind(code)
            .bind(self.clock.now().timestamp_millis())
            .execute(self.pool.get_pool())
            .await
            .map_err(InfrastructureError::from)?;

        debug!(identity = %mask_email(identity), "Stored OTP row");
        Ok(())
    }

    async fn verify(&self, identity: &str, code: &str) -> OtpResult<VerificationOutcome> {
        let Some(record) = self.find(identity).await? else {
            return Ok(VerificationOutcome::NotFound);
        };

        let outcome = record.evaluate(code, self.clock.now(), &self.policy);
        match outcome {
            VerificationOutcome::Verified => {
                if !self.consume(&record).await? {
                    debug!(
                        identity = %mask_email(identity),
                        "OTP consumed or replaced concurrently"
                    );
                    return Ok(VerificationOutcome::NotFound);
                }
            }
            VerificationOutcome::Mismatch if self.policy.invalidates_on_mismatch() => {
                self.consume(&record).await?;
            }
            _ => {}
        }

        Ok(outcome)
    }

    async fn remove(&self, identity: &str) -> OtpResult<bool> {
        let result = sqlx::query("DELETE FROM otp_codes WHERE identity = ?")
            .bind(identity)
            .execute(self.pool.get_pool())
            .await
            .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self) -> OtpResult<u64> {
        let cutoff = self.policy.cutoff(self.clock.now()).timestamp_millis();
        let result = sqlx::query("DELETE FROM otp_codes WHERE issued_at < ?")
            .bind(cutoff)
            .execute(self.pool.get_pool())
            .await
            .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected())
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Relational
    }
}
