//! # Email OTP Core
//!
//! Core business logic for email one-time passcodes.
//! This crate contains the OTP record and outcome types, the code generator,
//! the storage and mail dispatch contracts, the auth facade that ties them
//! together, and the error taxonomy shared by every backend.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
