//! Database configuration module

use serde::{Deserialize, Serialize};

use crate::utils::validation::{validators, Validate, ValidationErrors};

/// Database configuration for the SQLite OTP backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`sqlite://otp.db`, `sqlite::memory:`)
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout: u64,

    /// Create the database file when it does not exist
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,

    /// Enable SQL statement logging
    #[serde(default)]
    pub enable_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from("sqlite://otp.db"),
            max_connections: 5,
            connect_timeout: 30,
            create_if_missing: default_create_if_missing(),
            enable_logging: false,
        }
    }
}

impl DatabaseConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let url = std::env::var("DATABASE_URL").unwrap_or(defaults.url);
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_connections);
        let connect_timeout = std::env::var("DATABASE_CONNECT_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.connect_timeout);

        Self {
            url,
            max_connections,
            connect_timeout,
            ..defaults
        }
    }

    /// Create a new database configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Configuration for a private in-memory database
    ///
    /// Each connection to `sqlite::memory:` opens a separate database, so the
    /// pool is pinned to a single connection.
    pub fn in_memory() -> Self {
        Self {
            url: String::from("sqlite::memory:"),
            max_connections: 1,
            ..Default::default()
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Enable SQL statement logging
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }

    /// Whether the URL points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !validators::has_scheme(&self.url, &["sqlite"]) {
            errors.add_error("url", "must be a sqlite: URL", "scheme");
        }
        if self.max_connections == 0 {
            errors.add_error("max_connections", "must be at least 1", "range");
        }
        if self.is_in_memory() && self.max_connections != 1 {
            errors.add_error(
                "max_connections",
                "an in-memory database requires exactly one connection",
                "range",
            );
        }
        errors.into_result()
    }
}

fn default_create_if_missing() -> bool {
    true
}
