//! Mail dispatch module
//!
//! - [`SmtpMailer`]: delivers codes over SMTP with lettre
//! - [`LogMailer`]: writes a log line instead of sending, for development

pub mod log_mailer;
pub mod smtp;

pub use eo_shared::config::{MailServerConfig, SmtpSecurity};
pub use log_mailer::LogMailer;
pub use smtp::SmtpMailer;
