//! Email OTP service module
//!
//! This module provides the complete passcode workflow:
//! - Code generation and persistence through an [`OtpStore`]
//! - Email delivery through a [`MailDispatcher`]
//! - Verification with lazy expiry and single-use consumption

mod config;
mod service;
mod traits;

#[cfg(test)]
pub(crate) mod tests;

pub use config::OtpServiceConfig;
pub use service::EmailOtpAuth;
pub use traits::{MailDispatcher, OtpStore};
