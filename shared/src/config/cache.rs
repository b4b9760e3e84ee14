//! Cache configuration module

use serde::{Deserialize, Serialize};

use crate::utils::validation::{validators, Validate, ValidationErrors};

/// Redis cache configuration for the keyed OTP backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Prefix for OTP keys (`{prefix}:{identity}`)
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Maximum number of retry attempts for transient Redis errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (exponential backoff)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            key_prefix: default_key_prefix(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let url = std::env::var("REDIS_URL").unwrap_or(defaults.url);
        let key_prefix = std::env::var("REDIS_KEY_PREFIX").unwrap_or(defaults.key_prefix);
        let max_retries = std::env::var("REDIS_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_retries);

        Self {
            url,
            key_prefix,
            max_retries,
            ..defaults
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for OTP keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !validators::has_scheme(&self.url, &["redis", "rediss", "redis+unix"]) {
            errors.add_error("url", "must be a redis:// or rediss:// URL", "scheme");
        }
        if self.max_retries == 0 {
            errors.add_error("max_retries", "must be at least 1", "range");
        }
        errors.into_result()
    }
}

fn default_key_prefix() -> String {
    String::from("otp")
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}
