//! Request Password Reset Use Case
//!
//! An unknown email is answered with `UserNotFound` (404). This does reveal
//! whether an address is registered; the response shape is kept for client
//! compatibility.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::link_token::{LinkPurpose, LinkTokenService};
use crate::application::mail::{dispatch, recovery_message};
use crate::domain::repository::{MailSender, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct RequestPasswordResetUseCase<R, M>
where
    R: UserRepository,
    M: MailSender,
{
    user_repo: Arc<R>,
    mailer: Arc<M>,
    links: Arc<LinkTokenService>,
    config: Arc<AuthConfig>,
}

impl<R, M> RequestPasswordResetUseCase<R, M>
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

    pub async fn execute(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email)?;
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let token = self.links.issue(LinkPurpose::PasswordRecovery, &user.email);
        let message = recovery_message(&self.config.public_base_url, &token);
        if dispatch(self.mailer.as_ref(), &user.email, &message).await {
            tracing::info!(user_id = %user.user_id, "Password recovery link sent");
        }

        Ok(())
    }
}
