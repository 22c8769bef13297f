//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::config::AuthConfig;
use crate::domain::repository::{MailSender, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_user;

/// Create the auth router
///
/// Paths are relative to the API prefix: `/auth/...` plus the profile at
/// `/me`. Confirmation links in outgoing mail assume the same layout.
pub fn auth_router<R, M>(repo: R, mailer: M, config: AuthConfig) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    router_with_state(AuthAppState::new(repo, mailer, config))
}

/// Create the auth router around an existing state
pub fn router_with_state<R, M>(state: AuthAppState<R, M>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let profile = Router::new()
        .route(
            "/me",
            get(handlers::get_profile::<R, M>).post(handlers::post_profile::<R, M>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user::<R, M>,
        ));

    Router::new()
        .route("/auth/token", post(handlers::login::<R, M>))
        .route("/auth/register", post(handlers::register::<R, M>))
        .route(
            "/auth/register-confirm",
            get(handlers::confirm_registration::<R, M>),
        )
        .route(
            "/auth/resend-email-verification",
            post(handlers::resend_verification::<R, M>),
        )
        .route(
            "/auth/password-recovery",
            post(handlers::request_password_reset::<R, M>),
        )
        .route(
            "/auth/password-recovery/confirm",
            post(handlers::confirm_password_reset::<R, M>),
        )
        .merge(profile)
        .with_state(state)
}
