//! Confirm Registration Use Case
//!
//! Flips the account named by a registration link to verified. The email
//! comes from the verified token payload alone.

use std::sync::Arc;

use crate::application::link_token::{LinkPurpose, LinkTokenService};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct ConfirmRegistrationUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
    links: Arc<LinkTokenService>,
}

impl<R> ConfirmRegistrationUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>, links: Arc<LinkTokenService>) -> Self {
        Self { user_repo, links }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<Email> {
        let email = self.links.verify(LinkPurpose::Registration, token)?;

        if !self.user_repo.update_verification(&email).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(email = %email, "Email verified");
        Ok(email)
    }
}
