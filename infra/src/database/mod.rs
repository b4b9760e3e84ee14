//! Database module - SQLite implementation using SQLx
//!
//! This module provides:
//! - Connection pool management
//! - The relational OTP store

pub mod connection;
pub mod otp_store;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use eo_shared::config::DatabaseConfig;
pub use otp_store::SqliteOtpStore;
