//! Application Layer
//!
//! Token services, the CSRF guard, and one use case per flow.

pub mod access_token;
pub mod authenticate;
pub mod config;
pub mod confirm_password_reset;
pub mod confirm_registration;
pub mod csrf;
pub mod link_token;
pub mod login;
pub mod mail;
pub mod register;
pub mod request_password_reset;
pub mod resend_verification;

// Re-exports
pub use access_token::{AccessTokenService, Claims, Subject};
pub use authenticate::{AccountGate, AuthenticateUseCase};
pub use config::AuthConfig;
pub use confirm_password_reset::{ConfirmPasswordResetInput, ConfirmPasswordResetUseCase};
pub use confirm_registration::ConfirmRegistrationUseCase;
pub use csrf::{CsrfError, CsrfGuard, CsrfTokenPair};
pub use link_token::{LinkPurpose, LinkTokenService};
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use request_password_reset::RequestPasswordResetUseCase;
pub use resend_verification::{ResendOutcome, ResendVerificationUseCase};
