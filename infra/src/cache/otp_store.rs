//! OTP store on a key-value cache
//!
//! Each identity maps to one JSON record under `{prefix}:{identity}`:
//!
//! ```json
//! {"code":"482913","issued_at":"2024-01-01T00:00:00Z"}
//! ```
//!
//! No native TTL is set. Expiry is judged from `issued_at` when a code is
//! presented, and [`CacheOtpStore::purge_expired`] removes stale entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

use eo_core::domain::{Clock, ExpiryPolicy, OtpRecord, StorageBackend, VerificationOutcome};
use eo_core::errors::OtpResult;
use eo_core::services::OtpStore;
use eo_shared::email::mask_email;

use super::{CacheConfig, KeyValueCache};
use crate::InfrastructureError;

/// Serialized form of a cached OTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedOtp {
    pub code: String,
    pub issued_at: DateTime<Utc>,
}

impl CachedOtp {
    fn into_record(self, identity: &str) -> OtpRecord {
        OtpRecord::new(identity, self.code, self.issued_at)
    }
}

/// [`OtpStore`] over any [`KeyValueCache`]
pub struct CacheOtpStore<C: KeyValueCache> {
    cache: C,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    policy: ExpiryPolicy,
}

impl<C: KeyValueCache> CacheOtpStore<C> {
    pub fn new(cache: C, config: CacheConfig, clock: Arc<dyn Clock>, policy: ExpiryPolicy) -> Self {
        Self {
            cache,
            config,
            clock,
            policy,
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn key(&self, identity: &str) -> String {
        self.config.make_key(identity)
    }

    /// Prefix shared by every OTP key, used to scope purges
    fn scan_prefix(&self) -> String {
        self.config.make_key("")
    }

    fn decode(raw: &str, identity: &str) -> Result<CachedOtp, InfrastructureError> {
        serde_json::from_str(raw).map_err(|e| {
            error!(
                identity = %mask_email(identity),
                error = %e,
                "Corrupt OTP record in cache"
            );
            InfrastructureError::Serialization(e)
        })
    }
}

#[async_trait]
impl<C: KeyValueCache> OtpStore for CacheOtpStore<C> {
    async fn put(&self, identity: &str, code: &str) -> OtpResult<()> {
        let cached = CachedOtp {
            code: code.to_string(),
            issued_at: self.clock.now(),
        };
        let raw = serde_json::to_string(&cached).map_err(InfrastructureError::from)?;

        self.cache.set(&self.key(identity), &raw).await?;
        debug!(identity = %mask_email(identity), "Cached OTP");
        Ok(())
    }

    async fn verify(&self, identity: &str, code: &str) -> OtpResult<VerificationOutcome> {
        let key = self.key(identity);
        let Some(raw) = self.cache.get(&key).await? else {
            return Ok(VerificationOutcome::NotFound);
        };

        let record = Self::decode(&raw, identity)?.into_record(identity);
        let outcome = record.evaluate(code, self.clock.now(), &self.policy);

        match outcome {
            VerificationOutcome::Verified => {
                // Only the exact value judged above may be consumed
                if !self.cache.delete_if_eq(&key, &raw).await? {
                    debug!(
                        identity = %mask_email(identity),
                        "OTP consumed or replaced concurrently"
                    );
                    return Ok(VerificationOutcome::NotFound);
                }
            }
            VerificationOutcome::Mismatch if self.policy.invalidates_on_mismatch() => {
                self.cache.delete_if_eq(&key, &raw).await?;
            }
            _ => {}
        }

        Ok(outcome)
    }

    async fn remove(&self, identity: &str) -> OtpResult<bool> {
        Ok(self.cache.delete(&self.key(identity)).await?)
    }

    async fn purge_expired(&self) -> OtpResult<u64> {
        let prefix = self.scan_prefix();
        let now = self.clock.now();
        let mut removed = 0;

        for key in self.cache.keys_with_prefix(&prefix).await? {
            let Some(raw) = self.cache.get(&key).await? else {
                continue;
            };
            let identity = key.strip_prefix(&prefix).unwrap_or(&key);

            let cached = match Self::decode(&raw, identity) {
                Ok(cached) => cached,
                Err(_) => {
                    warn!(identity = %mask_email(identity), "Skipping undecodable OTP record");
                    continue;
                }
            };

            if cached.into_record(identity).is_expired_at(now, &self.policy)
                && self.cache.delete_if_eq(&key, &raw).await?
            {
                removed += 1;
            }
        }

        Ok(removed)
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Cache
    }
}
