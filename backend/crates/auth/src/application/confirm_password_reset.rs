//! Confirm Password Reset Use Case

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::link_token::{LinkPurpose, LinkTokenService};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

pub struct ConfirmPasswordResetInput {
    pub token: String,
    pub password: String,
    pub password_repeat: String,
}

pub struct ConfirmPasswordResetUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
    links: Arc<LinkTokenService>,
    config: Arc<AuthConfig>,
}

impl<R> ConfirmPasswordResetUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>, links: Arc<LinkTokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            links,
            config,
        }
    }

    pub async fn execute(&self, input: ConfirmPasswordResetInput) -> AuthResult<()> {
        let password = RawPassword::with_repeat(input.password, input.password_repeat)?;
        let email = self
            .links
            .verify(LinkPurpose::PasswordRecovery, &input.token)?;

        let password_hash = UserPassword::from_raw(&password, self.config.pepper())?;
        if !self.user_repo.update_password(&email, &password_hash).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(email = %email, "Password reset");
        Ok(())
    }
}
