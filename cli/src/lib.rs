//! # Email OTP command line
//!
//! `email-otp request <email>` issues and mails a code, `verify` checks one,
//! `purge` removes expired records and `init-db` prepares the SQLite table.

pub mod actions;
pub mod commands;
pub mod dispatch;
pub mod telemetry;

pub use actions::Action;
pub use dispatch::Globals;
