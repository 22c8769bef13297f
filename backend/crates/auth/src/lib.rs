//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, user store and mailer traits
//! - `application/` - Token services, CSRF guard, one use case per flow
//! - `infra/` - PostgreSQL and in-memory stores, SMTP and log mailers
//! - `presentation/` - HTTP handlers, DTOs, router, bearer middleware
//!
//! ## Tokens
//! - Access tokens: HMAC-signed JWTs (`sub`, `role`, `device`, `exp`),
//!   sent as `Authorization: Bearer` or the `access_token` cookie
//! - Action links: timestamped, salted HMAC tokens carrying an email, one
//!   secret + salt per purpose (registration, password recovery)
//! - CSRF: double-submit cookie, signed half in a cookie, raw half echoed in
//!   a header
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Constant-time signature comparison everywhere
//! - Link failures never say whether a token was forged or stale
//! - Tokens are stateless: no revocation and no single-use tracking

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, ConfigError};
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryUserRepository, LogMailSender, PgUserRepository, SmtpMailSender, SmtpSettings};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
