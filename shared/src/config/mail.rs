//! Mail server configuration module

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::email::is_valid_email;
use crate::utils::validation::{validators, Validate, ValidationErrors};

/// Placeholder replaced by the generated code in the body template
pub const OTP_PLACEHOLDER: &str = "{{otp}}";

/// SMTP connection security
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain text connection, never upgraded
    None,
    /// Plain connection upgraded with STARTTLS when the server offers it
    #[default]
    Opportunistic,
    /// STARTTLS is mandatory
    Required,
    /// Implicit TLS from the first byte (SMTPS, usually port 465)
    Wrapper,
}

impl std::str::FromStr for SmtpSecurity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "plain" => Ok(SmtpSecurity::None),
            "opportunistic" | "starttls-optional" => Ok(SmtpSecurity::Opportunistic),
            "required" | "starttls" => Ok(SmtpSecurity::Required),
            "wrapper" | "tls" | "smtps" => Ok(SmtpSecurity::Wrapper),
            _ => Err(format!("Invalid SMTP security mode: {}", s)),
        }
    }
}

/// Mail server configuration for sending OTP emails
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MailServerConfig {
    /// SMTP host name
    pub host: String,

    /// SMTP port
    pub port: u16,

    /// Sender address, also used as the SMTP user name
    pub email: String,

    /// SMTP password (app password for hosted mailboxes)
    pub password: String,

    /// Display name of the sender
    pub sender_name: String,

    /// Subject line
    pub subject: String,

    /// HTML body template containing `{{otp}}`
    pub body: String,

    /// Connection security
    #[serde(default)]
    pub security: SmtpSecurity,
}

impl fmt::Debug for MailServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("email", &self.email)
            .field("password", &"****")
            .field("sender_name", &self.sender_name)
            .field("subject", &self.subject)
            .field("body", &self.body)
            .field("security", &self.security)
            .finish()
    }
}

impl Default for MailServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: 587,
            email: String::new(),
            password: String::new(),
            sender_name: String::from("Verification"),
            subject: String::from("Your verification code"),
            body: String::from("<p>Your verification code is <b>{{otp}}</b>. It expires in 5 minutes.</p>"),
            security: SmtpSecurity::default(),
        }
    }
}

impl MailServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("SMTP_HOST").unwrap_or(defaults.host),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            email: std::env::var("SMTP_EMAIL").unwrap_or(defaults.email),
            password: std::env::var("SMTP_PASSWORD").unwrap_or(defaults.password),
            sender_name: std::env::var("SMTP_SENDER_NAME").unwrap_or(defaults.sender_name),
            subject: std::env::var("SMTP_SUBJECT").unwrap_or(defaults.subject),
            body: std::env::var("SMTP_BODY").unwrap_or(defaults.body),
            security: std::env::var("SMTP_SECURITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.security),
        }
    }

    /// Render the body template for a code
    ///
    /// Every occurrence of `{{otp}}` is replaced.
    pub fn render_body(&self, code: &str) -> String {
        self.body.replace(OTP_PLACEHOLDER, code)
    }

    /// `From:` header value, e.g. `"Acme" <no-reply@acme.test>`
    pub fn from_header(&self) -> String {
        format!("\"{}\" <{}>", self.sender_name, self.email)
    }
}

impl Validate for MailServerConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !validators::not_empty(&self.host) {
            errors.add_error("host", "must not be empty", "required");
        }
        if self.port == 0 {
            errors.add_error("port", "must be greater than zero", "range");
        }
        if !is_valid_email(&self.email) {
            errors.add_error("email", "must be a valid sender address", "format");
        }
        if !validators::not_empty(&self.password) {
            errors.add_error("password", "must not be empty", "required");
        }
        if self.sender_name.contains(['"', '\r', '\n']) {
            errors.add_error("sender_name", "must not contain quotes or line breaks", "format");
        }
        if !validators::not_empty(&self.subject) {
            errors.add_error("subject", "must not be empty", "required");
        }
        if !self.body.contains(OTP_PLACEHOLDER) {
            errors.add_error("body", "must contain the {{otp}} placeholder", "placeholder");
        }
        errors.into_result()
    }
}
