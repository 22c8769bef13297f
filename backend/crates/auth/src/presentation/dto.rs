//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

// ============================================================================
// Login
// ============================================================================

/// OAuth2 password-flow form (`application/x-www-form-urlencoded`)
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// ============================================================================
// Registration
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    #[serde(alias = "repeat_password")]
    pub password_repeat: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

// ============================================================================
// Action links
// ============================================================================

/// `?token=...` on confirmation links
#[derive(Debug, Clone, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPasswordRequest {
    #[serde(alias = "new_password")]
    pub password: String,
    #[serde(alias = "repeat_password")]
    pub password_repeat: String,
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_verified: bool,
    /// Raw half of the CSRF pair; echo it in the CSRF header on the next mutation
    pub csrf_token: String,
}

// ============================================================================
// Generic
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OkResponse {
    pub status: String,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self::with_status("ok")
    }

    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}
