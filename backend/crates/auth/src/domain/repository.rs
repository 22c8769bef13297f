//! Repository Traits
//!
//! Interfaces for the external collaborators. Implementations live in the
//! infrastructure layer.

use crate::domain::entity::user::User;
use crate::domain::value_object::{
    email::Email, user_name::UserName, user_password::UserPassword,
};
use crate::error::AuthResult;

/// User store
///
/// Each operation is atomic over its own field set. Uniqueness of user name
/// and email is enforced by the store; `create` reports a clash as
/// `AuthError::UserAlreadyExists`.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Mark the account verified. `false` when no account has this email.
    async fn update_verification(&self, email: &Email) -> AuthResult<bool>;

    /// Replace the password hash. `false` when no account has this email.
    async fn update_password(&self, email: &Email, password: &UserPassword) -> AuthResult<bool>;
}

/// Outbound email
#[trait_variant::make(MailSender: Send)]
pub trait LocalMailSender {
    async fn send(&self, to: &Email, subject: &str, body: &str) -> AuthResult<()>;
}
