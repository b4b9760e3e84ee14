//! Store selection from configuration

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use eo_core::domain::{Clock, ExpiryPolicy, StorageBackend, SystemClock, VerificationOutcome};
use eo_core::errors::{OtpError, OtpResult};
use eo_core::services::OtpStore;
use eo_shared::config::{AppConfig, StoreKind};

use crate::cache::{CacheOtpStore, RedisClient};
use crate::database::{DatabasePool, SqliteOtpStore};

/// Either configured store behind one concrete type
pub enum AnyOtpStore {
    Redis(CacheOtpStore<RedisClient>),
    Sqlite(SqliteOtpStore),
}

/// Opens the store named by `otp.store`
pub struct OtpBackend;

impl OtpBackend {
    /// Connect using the wall clock
    pub async fn connect(config: &AppConfig) -> OtpResult<AnyOtpStore> {
        Self::connect_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Connect with an explicit time source
    ///
    /// # Errors
    ///
    /// `StoreConnect` when the backend cannot be reached, `Config` for
    /// malformed connection settings.
    pub async fn connect_with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> OtpResult<AnyOtpStore> {
        let policy = ExpiryPolicy::from_config(&config.otp)?;

        let store = match config.otp.store {
            StoreKind::Redis => {
                let client = RedisClient::new(&config.cache)
                    .await
                    .map_err(|e| e.into_connect_error())?;
                if !client.health_check().await.map_err(|e| e.into_connect_error())? {
                    return Err(OtpError::StoreConnect {
                        message: "Redis did not answer PING".to_string(),
                    });
                }
                AnyOtpStore::Redis(CacheOtpStore::new(client, config.cache.clone(), clock, policy))
            }
            StoreKind::Sqlite => {
                let pool = DatabasePool::new(&config.database)
                    .await
                    .map_err(|e| e.into_connect_error())?;
                AnyOtpStore::Sqlite(SqliteOtpStore::new(pool, clock, policy).await?)
            }
        };

        info!(
            store = %config.otp.store,
            expiry_seconds = config.otp.expiry_seconds,
            "OTP store connected"
        );
        Ok(store)
    }
}

#[async_trait]
impl OtpStore for AnyOtpStore {
    async fn put(&self, identity: &str, code: &str) -> OtpResult<()> {
        match self {
            AnyOtpStore::Redis(store) => store.put(identity, code).await,
            AnyOtpStore::Sqlite(store) => store.put(identity, code).await,
        }
    }

    async fn verify(&self, identity: &str, code: &str) -> OtpResult<VerificationOutcome> {
        match self {
            AnyOtpStore::Redis(store) => store.verify(identity, code).await,
            AnyOtpStore::Sqlite(store) => store.verify(identity, code).await,
        }
    }

    async fn remove(&self, identity: &str) -> OtpResult<bool> {
        match self {
            AnyOtpStore::Redis(store) => store.remove(identity).await,
            AnyOtpStore::Sqlite(store) => store.remove(identity).await,
        }
    }

    async fn purge_expired(&self) -> OtpResult<u64> {
        match self {
            AnyOtpStore::Redis(store) => store.purge_expired().await,
            AnyOtpStore::Sqlite(store) => store.purge_expired().await,
        }
    }

    fn backend(&self) -> StorageBackend {
        match self {
            AnyOtpStore::Redis(store) => store.backend(),
            AnyOtpStore::Sqlite(store) => store.backend(),
        }
    }
}
