//! Application Configuration
//!
//! One immutable [`AuthConfig`] is resolved at startup (from the process
//! environment or any key lookup) and shared as `Arc<AuthConfig>`.
//! [`AuthConfig::validate`] runs on every load; a bad combination aborts
//! startup instead of surfacing on the first request.

use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderName;
use jsonwebtoken::Algorithm;
use platform::cookie::CookieConfig;
use platform::signed::SigningKey;
use thiserror::Error;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Configuration load/validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("setting {0} must not be empty")]
    EmptySecret(&'static str),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("SameSite=None cookies must also be Secure")]
    InsecureSameSiteNone,

    #[error("registration and password-recovery links must not share a secret and salt")]
    SharedLinkSigning,

    #[error("unsupported access token algorithm {0:?} (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("CSRF token location {0:?} is not supported (only \"header\")")]
    UnsupportedTokenLocation(String),
}

/// Where the client echoes the raw CSRF token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLocation {
    Header,
    Body,
}

impl TokenLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenLocation::Header => "header",
            TokenLocation::Body => "body",
        }
    }
}

impl FromStr for TokenLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "header" => Ok(TokenLocation::Header),
            "body" => Ok(TokenLocation::Body),
            _ => Err("expected header or body".to_string()),
        }
    }
}

/// Access token (JWT) settings
#[derive(Debug, Clone)]
pub struct AccessTokenConfig {
    pub secret: SigningKey,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
    pub cookie_name: String,
}

impl AccessTokenConfig {
    /// Cookie carrying the access token after login: HttpOnly, Secure,
    /// SameSite=Lax, living as long as the token
    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.cookie_name.clone(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            max_age_secs: Some(self.ttl_minutes.saturating_mul(60)),
        }
    }
}

/// Secret, salt and lifetime for one link purpose
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSigning {
    pub secret: SigningKey,
    pub salt: String,
    pub max_age: Duration,
}

#[derive(Debug, Clone)]
pub struct LinkTokenConfig {
    pub registration: LinkSigning,
    pub password_recovery: LinkSigning,
}

/// Double-submit CSRF settings
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    pub secret: SigningKey,
    pub salt: String,
    /// Attributes of the signed-token cookie; `max_age_secs` mirrors `max_age`
    pub cookie: CookieConfig,
    pub max_age: Duration,
    pub header_name: String,
    /// Optional scheme prefix, e.g. `Bearer` for `X-CSRF-Token: Bearer <token>`
    pub header_type: Option<String>,
    pub token_location: TokenLocation,
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_token: AccessTokenConfig,
    pub links: LinkTokenConfig,
    pub csrf: CsrfConfig,
    /// Prefix for links placed in emails, e.g. `https://shop.example/api/v1`
    pub public_base_url: String,
    pub password_pepper: Option<SigningKey>,
}

impl AuthConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup, then validate
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(get);

        let algorithm_name = vars.or("JWT_ALGORITHM", "HS256");
        let algorithm = Algorithm::from_str(&algorithm_name)
            .map_err(|_| ConfigError::UnsupportedAlgorithm(algorithm_name.clone()))?;

        let access_token = AccessTokenConfig {
            secret: vars.secret("JWT_SECRET_KEY")?,
            algorithm,
            ttl_minutes: vars.parse("ACCESS_TOKEN_TTL_MINUTES", 60 * 24)?,
            cookie_name: vars.or("ACCESS_TOKEN_COOKIE_NAME", "access_token"),
        };

        let links = LinkTokenConfig {
            registration: LinkSigning {
                secret: vars.secret("URL_SECRET_KEY_REG")?,
                salt: vars.or("URL_SALT_REG", "register-confirm"),
                max_age: Duration::from_secs(vars.parse("REGISTER_LINK_MAX_AGE_SECS", 600)?),
            },
            password_recovery: LinkSigning {
                secret: vars.secret("URL_SECRET_KEY_PWD")?,
                salt: vars.or("URL_SALT_PWD", "password-recovery"),
                max_age: Duration::from_secs(vars.parse("RECOVERY_LINK_MAX_AGE_SECS", 600)?),
            },
        };

        let csrf_max_age: u64 = vars.parse("CSRF_MAX_AGE", 3600)?;
        let csrf = CsrfConfig {
            secret: vars.secret("CSRF_SECRET_KEY")?,
            salt: vars.or("CSRF_SALT", "csrf-salt"),
            cookie: CookieConfig {
                name: vars.or("CSRF_COOKIE_KEY", "csrf-token"),
                path: vars.or("CSRF_COOKIE_PATH", "/"),
                domain: vars.optional("CSRF_COOKIE_DOMAIN"),
                secure: vars.flag("CSRF_COOKIE_SECURE", true)?,
                http_only: vars.flag("CSRF_HTTPONLY", true)?,
                same_site: vars.parse("CSRF_COOKIE_SAMESITE", SameSite::Strict)?,
                max_age_secs: Some(i64::try_from(csrf_max_age).unwrap_or(i64::MAX)),
            },
            max_age: Duration::from_secs(csrf_max_age),
            header_name: vars.or("CSRF_HEADER_NAME", "X-CSRF-Token"),
            header_type: vars.optional("CSRF_HEADER_TYPE"),
            token_location: vars.parse("CSRF_TOKEN_LOCATION", TokenLocation::Header)?,
        };

        let config = Self {
            access_token,
            links,
            csrf,
            public_base_url: vars
                .or("PUBLIC_BASE_URL", "http://127.0.0.1:8000/api/v1")
                .trim_end_matches('/')
                .to_string(),
            password_pepper: vars
                .optional("PASSWORD_PEPPER")
                .map(SigningKey::new)
                .transpose()
                .map_err(|_| ConfigError::EmptySecret("PASSWORD_PEPPER"))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(
            self.access_token.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::UnsupportedAlgorithm(format!(
                "{:?}",
                self.access_token.algorithm
            )));
        }
        if self.access_token.ttl_minutes <= 0 {
            return Err(ConfigError::ZeroDuration("ACCESS_TOKEN_TTL_MINUTES"));
        }

        let reg = &self.links.registration;
        let pwd = &self.links.password_recovery;
        if reg.secret == pwd.secret && reg.salt == pwd.salt {
            return Err(ConfigError::SharedLinkSigning);
        }
        if reg.max_age.is_zero() {
            return Err(ConfigError::ZeroDuration("REGISTER_LINK_MAX_AGE_SECS"));
        }
        if pwd.max_age.is_zero() {
            return Err(ConfigError::ZeroDuration("RECOVERY_LINK_MAX_AGE_SECS"));
        }

        if self.csrf.cookie.same_site == SameSite::None && !self.csrf.cookie.secure {
            return Err(ConfigError::InsecureSameSiteNone);
        }
        if HeaderName::from_bytes(self.csrf.header_name.as_bytes()).is_err() {
            return Err(ConfigError::Invalid {
                var: "CSRF_HEADER_NAME",
                value: self.csrf.header_name.clone(),
                reason: "not a valid HTTP header name".to_string(),
            });
        }
        if self.csrf.max_age.is_zero() {
            return Err(ConfigError::ZeroDuration("CSRF_MAX_AGE"));
        }
        if self.csrf.token_location != TokenLocation::Header {
            return Err(ConfigError::UnsupportedTokenLocation(
                self.csrf.token_location.as_str().to_string(),
            ));
        }

        Ok(())
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_ref().map(SigningKey::as_bytes)
    }
}

/// Typed access over a string lookup
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Present and non-blank
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Required; surrounding whitespace is stripped, so a blank value is empty
    fn secret(&self, key: &'static str) -> Result<SigningKey, ConfigError> {
        let raw = (self.0)(key).ok_or(ConfigError::Missing(key))?;
        SigningKey::new(raw.trim()).map_err(|_| ConfigError::EmptySecret(key))
    }

    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            None => Ok(default),
            Some(value) => match value.parse::<T>() {
                Ok(parsed) => Ok(parsed),
                Err(e) => Err(ConfigError::Invalid {
                    var: key,
                    reason: e.to_string(),
                    value,
                }),
            },
        }
    }

    fn flag(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.optional(key).map(|v| v.to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
            Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
            Some(value) => Err(ConfigError::Invalid {
                var: key,
                value,
                reason: "expected a boolean".to_string(),
            }),
        }
    }
}
