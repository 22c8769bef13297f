//! Register Use Case
//!
//! Creates a pending (unverified) account and mails the confirmation link.
//! The user row is committed before the mail goes out; a failed send does
//! not undo the registration.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::link_token::{LinkPurpose, LinkTokenService};
use crate::application::mail::{dispatch, registration_message};
use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::{MailSender, UserRepository};
use crate::domain::value_object::{
    email::Email,
    phone_number::PhoneNumber,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

const MAX_PERSONAL_NAME_CHARS: usize = 50;

/// Register input
pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_repeat: String,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub user_name: UserName,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
}

pub struct RegisterUseCase<R, M>
where
    R: UserRepository,
    M: MailSender,
{
    user_repo: Arc<R>,
    mailer: Arc<M>,
    links: Arc<LinkTokenService>,
    config: Arc<AuthConfig>,
}

impl<R, M> RegisterUseCase<R, M>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let user_name =
            UserName::new(&input.user_name).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(&input.email)?;
        let phone_number = PhoneNumber::new(&input.phone_number)?;
        let first_name = personal_name("First name", input.first_name)?;
        let last_name = personal_name("Last name", input.last_name)?;
        let password = RawPassword::with_repeat(input.password, input.password_repeat)?;

        if self.user_repo.find_by_user_name(&user_name).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = UserPassword::from_raw(&password, self.config.pepper())?;

        let user = User::new(NewUser {
            user_name,
            email,
            phone_number,
            first_name,
            last_name,
            password_hash,
        });

        // A concurrent registration can still win the race; the store
        // reports that as UserAlreadyExists.
        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.user_name,
            "User registered"
        );

        let token = self.links.issue(LinkPurpose::Registration, &user.email);
        let message = registration_message(&self.config.public_base_url, &token);
        dispatch(self.mailer.as_ref(), &user.email, &message).await;

        Ok(RegisterOutput {
            user_name: user.user_name,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        })
    }
}

fn personal_name(field: &str, raw: String) -> AuthResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > MAX_PERSONAL_NAME_CHARS {
        return Err(AuthError::Validation(format!(
            "{field} must be at most {MAX_PERSONAL_NAME_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}
