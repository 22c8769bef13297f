//! Login Use Case
//!
//! Verifies credentials and issues an access token. Unknown user names
//! still pay for one Argon2 verification so response time does not reveal
//! which accounts exist.

use std::sync::Arc;

use platform::client::DeviceFingerprint;
use platform::password::verify_dummy;

use crate::application::access_token::{AccessTokenService, Subject, TOKEN_TYPE};
use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{user_name::UserName, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub user_name: String,
    pub password: String,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub access_token: String,
    pub token_type: &'static str,
}

pub struct LoginUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
    tokens: Arc<AccessTokenService>,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>, tokens: Arc<AccessTokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            tokens,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: LoginInput,
        fingerprint: DeviceFingerprint,
    ) -> AuthResult<LoginOutput> {
        // A password outside the policy can never match a stored hash
        let password = RawPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        let user = match UserName::new(&input.user_name) {
            Ok(user_name) => self.user_repo.find_by_user_name(&user_name).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            verify_dummy(password.inner());
            return Err(AuthError::InvalidCredentials);
        };

        if !user.password_hash.verify(&password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        if user.is_blocked {
            return Err(AuthError::AccountBlocked);
        }

        let subject = Subject {
            user_name: user.user_name.as_str().to_string(),
            role: Some(user.user_role),
            device: Some(fingerprint.to_string()),
        };
        let access_token = self
            .tokens
            .issue(&subject, self.config.access_token.ttl_minutes)?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.user_name,
            device = %fingerprint,
            "User logged in"
        );

        Ok(LoginOutput {
            access_token,
            token_type: TOKEN_TYPE,
        })
    }
}
