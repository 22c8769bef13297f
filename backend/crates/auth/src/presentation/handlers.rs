//! HTTP Handlers

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::{Extension, Form, Json};
use platform::client::DeviceFingerprint;
use platform::cookie::set_cookie_header;

use crate::application::config::AuthConfig;
use crate::application::{
    AccessTokenService, ConfirmPasswordResetInput, ConfirmPasswordResetUseCase,
    ConfirmRegistrationUseCase, CsrfGuard, LinkTokenService, LoginInput, LoginUseCase,
    RegisterInput, RegisterUseCase, RequestPasswordResetUseCase, ResendOutcome,
    ResendVerificationUseCase,
};
use crate::domain::repository::{MailSender, UserRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{
    EmailRequest, LoginForm, NewPasswordRequest, OkResponse, ProfileResponse, RegisterRequest,
    RegisterResponse, TokenQuery, TokenResponse,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for auth handlers
pub struct AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<AuthConfig>,
    pub access_tokens: Arc<AccessTokenService>,
    pub links: Arc<LinkTokenService>,
    pub csrf: Arc<CsrfGuard>,
}

impl<R, M> AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    pub fn new(repo: R, mailer: M, config: AuthConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            mailer: Arc::new(mailer),
            access_tokens: Arc::new(AccessTokenService::new(&config.access_token)),
            links: Arc::new(LinkTokenService::new(&config.links)),
            csrf: Arc::new(CsrfGuard::new(&config.csrf)),
            config: Arc::new(config),
        }
    }
}

// Manual impl: R and M themselves need not be Clone
impl<R, M> Clone for AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            config: self.config.clone(),
            access_tokens: self.access_tokens.clone(),
            links: self.links.clone(),
            csrf: self.csrf.clone(),
        }
    }
}

// ============================================================================
// Login
// ============================================================================

/// POST /auth/token
pub async fn login<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Form(form): Form<LoginForm>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let fingerprint = DeviceFingerprint::from_request(&headers, Some(addr.ip()));

    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.access_tokens.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            LoginInput {
                user_name: form.username,
                password: form.password,
            },
            fingerprint,
        )
        .await?;

    let cookie = set_cookie_header(&state.config.access_token.cookie(), &output.access_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(TokenResponse {
            access_token: output.access_token,
            token_type: output.token_type.to_string(),
        }),
    ))
}

// ============================================================================
// Registration
// ============================================================================

/// POST /auth/register
pub async fn register<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.links.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(RegisterInput {
            user_name: req.username,
            email: req.email,
            phone_number: req.phone_number,
            first_name: req.first_name,
            last_name: req.last_name,
            password: req.password,
            password_repeat: req.password_repeat,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            username: output.user_name.into_inner(),
            email: output.email.into_inner(),
            first_name: output.first_name,
            last_name: output.last_name,
        }),
    ))
}

/// GET /auth/register-confirm?token=...
pub async fn confirm_registration<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Query(query): Query<TokenQuery>,
) -> AuthResult<Json<OkResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let use_case = ConfirmRegistrationUseCase::new(state.repo.clone(), state.links.clone());
    use_case.execute(&query.token).await?;

    Ok(Json(OkResponse::ok()))
}

/// POST /auth/resend-email-verification
pub async fn resend_verification<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<EmailRequest>,
) -> AuthResult<Json<OkResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let use_case = ResendVerificationUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.links.clone(),
        state.config.clone(),
    );

    let response = match use_case.execute(&req.email).await? {
        ResendOutcome::AlreadyVerified(email) => {
            OkResponse::with_status(format!("{email} already verified."))
        }
        ResendOutcome::Sent => OkResponse::ok(),
    };

    Ok(Json(response))
}

// ============================================================================
// Password Recovery
// ============================================================================

/// POST /auth/password-recovery
pub async fn request_password_reset<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<EmailRequest>,
) -> AuthResult<Json<OkResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let use_case = RequestPasswordResetUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.links.clone(),
        state.config.clone(),
    );
    use_case.execute(&req.email).await?;

    Ok(Json(OkResponse::ok()))
}

/// POST /auth/password-recovery/confirm?token=...
pub async fn confirm_password_reset<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Query(query): Query<TokenQuery>,
    Json(req): Json<NewPasswordRequest>,
) -> AuthResult<Json<OkResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let use_case = ConfirmPasswordResetUseCase::new(
        state.repo.clone(),
        state.links.clone(),
        state.config.clone(),
    );
    use_case
        .execute(ConfirmPasswordResetInput {
            token: query.token,
            password: req.password,
            password_repeat: req.password_repeat,
        })
        .await?;

    Ok(Json(OkResponse::ok()))
}

// ============================================================================
// Profile (requires authentication)
// ============================================================================

/// GET /me
///
/// Mints a CSRF pair: the signed half is set as a cookie, the raw half is
/// returned in the body.
pub async fn get_profile<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> impl IntoResponse
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let pair = state.csrf.generate_tokens();
    let cookie = state.csrf.set_cookie(&pair.signed);

    (
        [(header::SET_COOKIE, cookie)],
        Json(ProfileResponse {
            username: user.user_name.into_inner(),
            email: user.email.into_inner(),
            phone_number: user.phone_number.as_str().to_string(),
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.user_role.to_string(),
            is_verified: user.is_verified,
            csrf_token: pair.raw,
        }),
    )
}

/// POST /me
///
/// Consumes the CSRF pair minted by `GET /me` and clears its cookie.
pub async fn post_profile<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    state.csrf.validate(&headers)?;

    tracing::debug!(username = %user.user_name, "CSRF pair consumed");

    Ok((
        [(header::SET_COOKIE, state.csrf.unset_cookie())],
        Json(OkResponse::ok()),
    ))
}
