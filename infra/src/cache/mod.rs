//! Cache module for key-value OTP storage
//!
//! This module provides the Redis client with connection management and
//! retry logic, an in-process cache for development and tests, and the
//! OTP store that keeps one JSON record per identity on top of either.

use async_trait::async_trait;

use crate::InfrastructureError;

pub mod memory_cache;
pub mod otp_store;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use memory_cache::MemoryCache;
pub use otp_store::{CacheOtpStore, CachedOtp};
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use eo_shared::config::CacheConfig;

/// Minimal string key-value operations needed by [`CacheOtpStore`]
///
/// Values never carry a native TTL; expiry is decided by the store.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), InfrastructureError>;

    /// `true` if the key existed
    async fn delete(&self, key: &str) -> Result<bool, InfrastructureError>;

    /// Delete `key` only while it still holds `expected`; `true` if deleted
    async fn delete_if_eq(&self, key: &str, expected: &str) -> Result<bool, InfrastructureError>;

    /// All keys starting with `prefix`
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, InfrastructureError>;
}
