//! Outbound email.
//!
//! SMTP through `lettre` when `SMTP_HOST` is configured, otherwise messages are
//! only written to the log.
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    address::AddressError,
    message::{Mailbox, header::ContentType},
    transport::smtp::{self, authentication::Credentials},
};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SmtpConfig;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] smtp::Error),

    #[error("Mail transport unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, from: &str) -> Result<Self, MailError> {
        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.port(config.port).build(),
            from: from.parse()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject)
            .header(ContentType::TEXT_PLAIN);

        for recipient in &email.recipients {
            builder = builder.to(recipient.parse()?);
        }

        self.transport.send(builder.body(email.body)?).await?;

        Ok(())
    }
}

/// Writes messages to the log instead of delivering them. Bodies can hold
/// one-time codes, so they and the recipients only appear at `debug`.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        info!(subject = %email.subject, "Email not delivered, no SMTP configured");
        debug!(
            recipients = ?email.recipients,
            "Undelivered email body:\n{}",
            email.body
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;
    use crate::log_capture::CapturedLogs;

    fn otp_email() -> OutgoingEmail {
        OutgoingEmail {
            subject: "Your OTP for Verification".to_string(),
            body: "Your OTP is 482913. It will expire in 10 minutes.".to_string(),
            recipients: vec!["birder@example.com".to_string()],
        }
    }

    #[tokio::test]
    async fn test_log_mailer_hides_body_at_info() {
        let (logs, _guard) = CapturedLogs::install(Level::INFO);

        LogMailer.send(otp_email()).await.unwrap();

        let text = logs.text();
        assert!(text.contains("Your OTP for Verification"));
        assert!(!text.contains("482913"));
        assert!(!text.contains("birder@example.com"));
    }

    #[tokio::test]
    async fn test_log_mailer_body_at_debug() {
        let (logs, _guard) = CapturedLogs::install(Level::DEBUG);

        LogMailer.send(otp_email()).await.unwrap();

        assert!(logs.text().contains("482913"));
    }
}
