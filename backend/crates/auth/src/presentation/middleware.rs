//! Auth Middleware
//!
//! Bearer gates for protected routes. The access token is read from
//! `Authorization: Bearer <token>` first, then from the cookie set at login.
//! On success the resolved user is stored in request extensions as
//! [`CurrentUser`].

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::cookie::extract_cookie;

use crate::application::{AccountGate, AuthenticateUseCase};
use crate::domain::entity::user::User;
use crate::domain::repository::{MailSender, UserRepository};
use crate::presentation::handlers::AuthAppState;

/// Authenticated user, set by [`require_user`] / [`require_verified_user`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Requires a valid token for an account that is not blocked
pub async fn require_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    req: Request,
    next: Next,
) -> Response
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    authenticate(state, req, next, AccountGate::Active).await
}

/// Like [`require_user`], and the account's email must be verified
pub async fn require_verified_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    req: Request,
    next: Next,
) -> Response
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    authenticate(state, req, next, AccountGate::Verified).await
}

async fn authenticate<R, M>(
    state: AuthAppState<R, M>,
    mut req: Request,
    next: Next,
    gate: AccountGate,
) -> Response
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let token = access_token(req.headers(), &state.config.access_token.cookie_name);

    let use_case = AuthenticateUseCase::new(state.repo.clone(), state.access_tokens.clone());
    match use_case.execute(token.as_deref(), gate).await {
        Ok(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Bearer header first, then the access-token cookie
pub fn access_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    bearer_token(headers).or_else(|| extract_cookie(headers, cookie_name))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}
