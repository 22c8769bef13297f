//! Outbound Mail Templates
//!
//! Bodies for the two action links, plus the fire-and-forget dispatch used
//! by registration and recovery: a failed send is logged, never returned.

use crate::domain::repository::MailSender;
use crate::domain::value_object::email::Email;

pub const REGISTRATION_PATH: &str = "/auth/register-confirm";
pub const RECOVERY_PATH: &str = "/auth/password-recovery/confirm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub subject: &'static str,
    pub body: String,
}

pub fn registration_message(base_url: &str, token: &str) -> MailMessage {
    MailMessage {
        subject: "Email confirmation",
        body: format!(
            "Thank you for registration! For verification, follow the link: {}",
            link(base_url, REGISTRATION_PATH, token)
        ),
    }
}

pub fn recovery_message(base_url: &str, token: &str) -> MailMessage {
    MailMessage {
        subject: "Password recovery",
        body: format!(
            "For password recovery follow the link: {}",
            link(base_url, RECOVERY_PATH, token)
        ),
    }
}

/// Tokens are URL-safe base64 joined by dots, so no escaping is needed
fn link(base_url: &str, path: &str, token: &str) -> String {
    format!("{base_url}{path}?token={token}")
}

/// Send and swallow the outcome
///
/// Returns whether delivery succeeded, for logging at the call site.
pub async fn dispatch<M>(mailer: &M, to: &Email, message: &MailMessage) -> bool
where
    M: MailSender,
{
    match mailer.send(to, message.subject, &message.body).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(to = %to, subject = message.subject, error = %e, "Mail dispatch failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_link() {
        let msg = registration_message("https://shop.example/api/v1", "abc.def.ghi");
        assert_eq!(msg.subject, "Email confirmation");
        assert!(
            msg.body
                .ends_with("https://shop.example/api/v1/auth/register-confirm?token=abc.def.ghi")
        );
    }

    #[test]
    fn test_recovery_link() {
        let msg = recovery_message("http://127.0.0.1:8000/api/v1", "t");
        assert_eq!(msg.subject, "Password recovery");
        assert_eq!(
            msg.body,
            "For password recovery follow the link: \
             http://127.0.0.1:8000/api/v1/auth/password-recovery/confirm?token=t"
        );
    }
}
