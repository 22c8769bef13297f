//! User Password Value Object
//!
//! Domain wrappers over `platform::password`: [`RawPassword`] for input
//! (validated, zeroized) and [`UserPassword`] for the stored Argon2id hash.

use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

use crate::error::{AuthError, AuthResult};

/// Raw password from user input
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate against the password policy (8 to 50 characters)
    pub fn new(raw: String) -> AuthResult<Self> {
        ClearTextPassword::new(raw)
            .map(Self)
            .map_err(|e| match e {
                PasswordPolicyError::EmptyOrWhitespace => {
                    AuthError::Validation("Password cannot be empty".to_string())
                }
                other => AuthError::from(other),
            })
    }

    /// Validate a password together with its confirmation field
    pub fn with_repeat(raw: String, repeat: String) -> AuthResult<Self> {
        let password = Self::new(raw)?;
        let repeat = Self::new(repeat)?;
        if !password.0.matches(&repeat.0) {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }
        Ok(password)
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

/// Hashed user password for database storage
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AuthResult<Self> {
        Ok(Self(raw.inner().hash(pepper)?))
    }

    pub fn from_db(phc: impl Into<String>) -> AuthResult<Self> {
        Ok(Self(HashedPassword::from_phc_string(phc)?))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}
