//! Action Link Tokens
//!
//! Email-bound tokens for the registration confirmation and password
//! recovery links. Each purpose has its own secret + salt, so a token minted
//! for one purpose never verifies under the other.

use std::time::Duration;

use platform::signed::TimedSigner;

use crate::application::config::{LinkSigning, LinkTokenConfig};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPurpose {
    Registration,
    PasswordRecovery,
}

#[derive(Debug, Clone)]
struct PurposeSigner {
    signer: TimedSigner,
    max_age: Duration,
}

impl PurposeSigner {
    fn new(signing: &LinkSigning) -> Self {
        Self {
            signer: TimedSigner::new(&signing.secret, &signing.salt),
            max_age: signing.max_age,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkTokenService {
    registration: PurposeSigner,
    password_recovery: PurposeSigner,
}

impl LinkTokenService {
    pub fn new(config: &LinkTokenConfig) -> Self {
        Self {
            registration: PurposeSigner::new(&config.registration),
            password_recovery: PurposeSigner::new(&config.password_recovery),
        }
    }

    fn for_purpose(&self, purpose: LinkPurpose) -> &PurposeSigner {
        match purpose {
            LinkPurpose::Registration => &self.registration,
            LinkPurpose::PasswordRecovery => &self.password_recovery,
        }
    }

    pub fn issue(&self, purpose: LinkPurpose, email: &Email) -> String {
        self.for_purpose(purpose).signer.sign(email.as_str())
    }

    pub fn issue_at(&self, purpose: LinkPurpose, email: &Email, now: i64) -> String {
        self.for_purpose(purpose).signer.sign_at(email.as_str(), now)
    }

    /// Recover the email a link was minted for
    ///
    /// Every failure collapses to `InvalidOrExpiredLink`; the caller never
    /// learns whether the link was forged or merely stale.
    pub fn verify(&self, purpose: LinkPurpose, token: &str) -> AuthResult<Email> {
        let p = self.for_purpose(purpose);
        let payload = p.signer.verify(token, p.max_age).map_err(|e| {
            tracing::debug!(?purpose, error = %e, "Link token rejected");
            AuthError::InvalidOrExpiredLink
        })?;
        Email::new(&payload).map_err(|_| AuthError::InvalidOrExpiredLink)
    }

    pub fn verify_at(&self, purpose: LinkPurpose, token: &str, now: i64) -> AuthResult<Email> {
        let p = self.for_purpose(purpose);
        let payload = p
            .signer
            .verify_at(token, p.max_age, now)
            .map_err(|e| {
                tracing::debug!(?purpose, error = %e, "Link token rejected");
                AuthError::InvalidOrExpiredLink
            })?;
        Email::new(&payload).map_err(|_| AuthError::InvalidOrExpiredLink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::signed::SigningKey;

    const T0: i64 = 1_760_000_000;

    fn service() -> LinkTokenService {
        LinkTokenService::new(&LinkTokenConfig {
            registration: LinkSigning {
                secret: SigningKey::new("reg-secret").unwrap(),
                salt: "register-confirm".to_string(),
                max_age: Duration::from_secs(600),
            },
            password_recovery: LinkSigning {
                secret: SigningKey::new("pwd-secret").unwrap(),
                salt: "password-recovery".to_string(),
                max_age: Duration::from_secs(600),
            },
        })
    }

    fn email(s: &str) -> Email {
        Email::new(s).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let svc = service();
        let alice = email("alice@example.com");

        let token = svc.issue_at(LinkPurpose::Registration, &alice, T0);
        assert_eq!(
            svc.verify_at(LinkPurpose::Registration, &token, T0 + 600).unwrap(),
            alice
        );

        let token = svc.issue(LinkPurpose::PasswordRecovery, &alice);
        assert_eq!(
            svc.verify(LinkPurpose::PasswordRecovery, &token).unwrap(),
            alice
        );
    }

    #[test]
    fn test_expired_link() {
        let svc = service();
        let token = svc.issue_at(LinkPurpose::PasswordRecovery, &email("a@b.co"), T0);
        assert!(matches!(
            svc.verify_at(LinkPurpose::PasswordRecovery, &token, T0 + 601),
            Err(AuthError::InvalidOrExpiredLink)
        ));
    }

    #[test]
    fn test_purposes_do_not_cross() {
        let svc = service();
        let token = svc.issue_at(LinkPurpose::Registration, &email("a@b.co"), T0);
        assert!(matches!(
            svc.verify_at(LinkPurpose::PasswordRecovery, &token, T0),
            Err(AuthError::InvalidOrExpiredLink)
        ));
    }

    #[test]
    fn test_garbage_link() {
        let svc = service();
        for bad in ["", "x", "a.b.c"] {
            assert!(matches!(
                svc.verify_at(LinkPurpose::Registration, bad, T0),
                Err(AuthError::InvalidOrExpiredLink)
            ));
        }
    }
}
