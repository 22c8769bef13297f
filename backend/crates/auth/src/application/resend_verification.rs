//! Resend Verification Use Case

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::link_token::{LinkPurpose, LinkTokenService};
use crate::application::mail::{dispatch, registration_message};
use crate::domain::repository::{MailSender, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendOutcome {
    /// Nothing sent
    AlreadyVerified(Email),
    Sent,
}

pub struct ResendVerificationUseCase<R, M>
where
    R: UserRepository,
    M: MailSender,
{
    user_repo: Arc<R>,
    mailer: Arc<M>,
    links: Arc<LinkTokenService>,
    config: Arc<AuthConfig>,
}

impl<R, M> ResendVerificationUseCase<R, M>
where
    R: UserRepository,
    M: MailSender,
{
    pub fn new(
        user_repo: Arc<R>,
        mailer: Arc<M>,
        links: Arc<LinkTokenService>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            mailer,
            links,
            config,
        }
    }

    pub async fn execute(&self, email: &str) -> AuthResult<ResendOutcome> {
        let email = Email::new(email)?;
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_verified {
            return Ok(ResendOutcome::AlreadyVerified(user.email));
        }

        let token = self.links.issue(LinkPurpose::Registration, &user.email);
        let message = registration_message(&self.config.public_base_url, &token);
        dispatch(self.mailer.as_ref(), &user.email, &message).await;

        Ok(ResendOutcome::Sent)
    }
}
