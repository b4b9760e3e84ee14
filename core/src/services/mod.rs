//! Services layer: the OTP facade and the expired-record purge.

pub mod otp;
pub mod purge;

pub use otp::{EmailOtpAuth, MailDispatcher, OtpServiceConfig, OtpStore};
pub use purge::{PurgeHandle, PurgeService};
