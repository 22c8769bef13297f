//! Mail Senders
//!
//! `SmtpMailSender` delivers over implicit-TLS SMTP via lettre.
//! `LogMailSender` only logs, for running without an SMTP relay.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::Mailbox,
    transport::smtp::authentication::Credentials,
};

use crate::domain::repository::MailSender;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// SMTP relay settings
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from", &self.from)
            .finish()
    }
}

pub struct SmtpMailSender {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailSender {
    pub fn new(settings: &SmtpSettings) -> AuthResult<Self> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| AuthError::Mail(format!("Invalid from address: {e}")))?;

        let builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| AuthError::Mail(format!("Failed to create SMTP transport: {e}")))?
            .port(settings.port);

        let transport = if settings.username.is_empty() {
            builder.build()
        } else {
            builder
                .credentials(Credentials::new(
                    settings.username.clone(),
                    settings.password.clone(),
                ))
                .build()
        };

        Ok(Self { from, transport })
    }
}

impl MailSender for SmtpMailSender {
    async fn send(&self, to: &Email, subject: &str, body: &str) -> AuthResult<()> {
        let to_mailbox: Mailbox = to
            .as_str()
            .parse()
            .map_err(|e| AuthError::Mail(format!("Invalid recipient email: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .body(body.to_owned())
            .map_err(|e| AuthError::Mail(format!("Failed to build email message: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AuthError::Mail(format!("Failed to send email: {e}")))?;

        tracing::info!(to = %to, subject = subject, "Email sent");
        Ok(())
    }
}

/// Writes outgoing mail to the log instead of sending it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailSender;

impl MailSender for LogMailSender {
    async fn send(&self, to: &Email, subject: &str, body: &str) -> AuthResult<()> {
        tracing::info!(to = %to, subject = subject, body = body, "Email (not sent, no SMTP relay)");
        Ok(())
    }
}
