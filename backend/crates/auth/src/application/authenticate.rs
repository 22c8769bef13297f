//! Authenticate Use Case
//!
//! Resolves an access token to the current user. Token validity and account
//! state are separate checks: a perfectly valid token for a blocked account
//! still fails, with `AccountBlocked` rather than `InvalidToken`.

use std::sync::Arc;

use crate::application::access_token::AccessTokenService;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

/// Which account states a route admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountGate {
    /// Any account that is not blocked
    Active,
    /// Not blocked and email verified
    Verified,
}

pub struct AuthenticateUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
    tokens: Arc<AccessTokenService>,
}

impl<R> AuthenticateUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>, tokens: Arc<AccessTokenService>) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn execute(&self, token: Option<&str>, gate: AccountGate) -> AuthResult<User> {
        let token = token.ok_or(AuthError::InvalidToken)?;
        let claims = self.tokens.verify(token)?;

        // A subject that no longer parses cannot name a stored user
        let user_name = UserName::new(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let user = self
            .user_repo
            .find_by_user_name(&user_name)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if user.is_blocked {
            return Err(AuthError::AccountBlocked);
        }
        if gate == AccountGate::Verified && !user.is_verified {
            return Err(AuthError::AccountUnverified);
        }

        Ok(user)
    }
}
