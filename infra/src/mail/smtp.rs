//! SMTP mail dispatch using lettre

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, error, info};

use eo_core::errors::OtpResult;
use eo_core::services::MailDispatcher;
use eo_shared::email::mask_email;
use eo_shared::validation::Validate;

use super::{MailServerConfig, SmtpSecurity};
use crate::InfrastructureError;

/// Sends OTP emails through an SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: MailServerConfig,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport from validated configuration
    ///
    /// No connection is opened until the first message is sent.
    pub fn new(config: MailServerConfig) -> Result<Self, InfrastructureError> {
        config
            .validate()
            .map_err(|e| InfrastructureError::Config(e.to_string()))?;

        let from: Mailbox = config
            .from_header()
            .parse()
            .map_err(|e| InfrastructureError::Config(format!("Invalid sender address: {}", e)))?;

        let transport = build_transport(&config)?;

        info!(
            host = %config.host,
            port = config.port,
            security = ?config.security,
            "SMTP mailer configured"
        );

        Ok(Self {
            transport,
            config,
            from,
        })
    }

    fn build_message(&self, recipient: &str, code: &str) -> Result<Message, InfrastructureError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| InfrastructureError::Mail(format!("Invalid recipient address: {}", e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(self.config.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(self.config.render_body(code))
            .map_err(|e| InfrastructureError::Mail(format!("Failed to build message: {}", e)))
    }
}

fn build_transport(
    config: &MailServerConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, InfrastructureError> {
    let host = config.host.as_str();
    let tls_error = |e: lettre::transport::smtp::Error| {
        InfrastructureError::Config(format!("Invalid SMTP TLS settings: {}", e))
    };

    let builder = match config.security {
        SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        SmtpSecurity::Opportunistic => {
            let params = TlsParameters::new(host.to_string()).map_err(tls_error)?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .tls(Tls::Opportunistic(params))
        }
        SmtpSecurity::Required => {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).map_err(tls_error)?
        }
        SmtpSecurity::Wrapper => {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host).map_err(tls_error)?
        }
    };

    Ok(builder
        .port(config.port)
        .credentials(Credentials::new(
            config.email.clone(),
            config.password.clone(),
        ))
        .build())
}

#[async_trait]
impl MailDispatcher for SmtpMailer {
    async fn send_otp(&self, recipient: &str, code: &str) -> OtpResult<()> {
        let message = self.build_message(recipient, code)?;

        match self.transport.send(message).await {
            Ok(response) => {
                debug!(
                    recipient = %mask_email(recipient),
                    code = response.code().to_string(),
                    "SMTP relay accepted message"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    recipient = %mask_email(recipient),
                    error = %e,
                    "Failed to send OTP email"
                );
                Err(InfrastructureError::Mail(e.to_string()).into())
            }
        }
    }
}
