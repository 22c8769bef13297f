//! Auth Error Types
//!
//! Auth-specific error variants that render through the unified
//! `kernel::error::AppError` problem-details response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use thiserror::Error;

use crate::application::csrf::CsrfError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

const BEARER: &str = "Bearer";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    /// Unknown user name or wrong password (never says which)
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Access token malformed, badly signed, or missing its subject
    #[error("Could not validate credentials")]
    InvalidToken,

    /// Access token expiry absent or in the past
    #[error("Token is no longer valid")]
    ExpiredToken,

    #[error("Account is blocked")]
    AccountBlocked,

    #[error("Account is not verified")]
    AccountUnverified,

    /// Action link tampered with or past its max age (deliberately one message)
    #[error("Token is invalid or expired")]
    InvalidOrExpiredLink,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Csrf(#[from] CsrfError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::UserAlreadyExists => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::AccountBlocked | AuthError::AccountUnverified => StatusCode::FORBIDDEN,
            AuthError::InvalidOrExpiredLink => StatusCode::BAD_REQUEST,
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Csrf(e) => e.status_code(),
            AuthError::Database(_) | AuthError::Mail(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::UserAlreadyExists => ErrorKind::Conflict,
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::ExpiredToken => {
                ErrorKind::Unauthorized
            }
            AuthError::AccountBlocked | AuthError::AccountUnverified => ErrorKind::Forbidden,
            AuthError::InvalidOrExpiredLink => ErrorKind::BadRequest,
            AuthError::Validation(_) => ErrorKind::UnprocessableEntity,
            AuthError::Csrf(e) => e.kind(),
            AuthError::Database(_) | AuthError::Mail(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    ///
    /// Server-side failures get a generic message; the cause is only logged.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        if kind.is_server_error() {
            return AppError::new(kind, "Oops.. Something unexpected happened");
        }

        let err = AppError::new(kind, self.to_string());
        match self {
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::ExpiredToken => {
                err.with_challenge(BEARER)
            }
            AuthError::AccountUnverified => {
                err.with_action("Confirm your email address or request a new confirmation link")
            }
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Mail(msg) => {
                tracing::error!(message = %msg, "Auth mail error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountBlocked => {
                tracing::warn!("Request from blocked account");
            }
            AuthError::Csrf(e) => {
                tracing::warn!(error = %e, "CSRF check failed");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            AuthError::Validation(err.message().to_string())
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
