//! CSRF Guard
//!
//! Double-submit cookie protection. A protected read mints a pair: the
//! signed half goes into a cookie, the raw half is handed to the client,
//! which echoes it in a header on the next mutating request. Verification
//! needs no server-side state.
//!
//! ## Validation order
//! 1. Signed cookie present, else `MissingToken`
//! 2. Header present and well-formed, else `MissingHeader` /
//!    `InvalidHeaderFormat`
//! 3. Cookie unsigns within `max_age`, else `TokenValidation`
//! 4. Unsigned cookie equals the header token, else `TokenValidation`

use std::time::Duration;

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use chrono::Utc;
use kernel::error::kind::ErrorKind;
use platform::cookie::{CookieConfig, delete_cookie_header, extract_cookie, set_cookie_header};
use platform::crypto::{constant_time_eq, random_csrf_token};
use platform::signed::{SignatureError, TimedSigner};
use thiserror::Error;

use crate::application::config::CsrfConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsrfError {
    #[error("{0}")]
    MissingHeader(String),

    #[error("{0}")]
    InvalidHeaderFormat(String),

    #[error("{0}")]
    MissingToken(String),

    #[error("{0}")]
    TokenValidation(String),
}

impl CsrfError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CsrfError::MissingHeader(_) | CsrfError::InvalidHeaderFormat(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            CsrfError::MissingToken(_) => StatusCode::BAD_REQUEST,
            CsrfError::TokenValidation(_) => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CsrfError::MissingHeader(_) | CsrfError::InvalidHeaderFormat(_) => {
                ErrorKind::UnprocessableEntity
            }
            CsrfError::MissingToken(_) => ErrorKind::BadRequest,
            CsrfError::TokenValidation(_) => ErrorKind::Unauthorized,
        }
    }
}

/// Freshly minted pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfTokenPair {
    /// Returned to the client, echoed back in the header
    pub raw: String,
    /// Stored in the cookie
    pub signed: String,
}

#[derive(Debug, Clone)]
pub struct CsrfGuard {
    signer: TimedSigner,
    cookie: CookieConfig,
    max_age: Duration,
    header_name: String,
    header_type: Option<String>,
}

impl CsrfGuard {
    pub fn new(config: &CsrfConfig) -> Self {
        Self {
            signer: TimedSigner::new(&config.secret, &config.salt),
            cookie: config.cookie.clone(),
            max_age: config.max_age,
            header_name: config.header_name.clone(),
            header_type: config.header_type.clone(),
        }
    }

    pub fn generate_tokens(&self) -> CsrfTokenPair {
        self.generate_tokens_at(Utc::now().timestamp())
    }

    pub fn generate_tokens_at(&self, now: i64) -> CsrfTokenPair {
        let raw = random_csrf_token();
        let signed = self.signer.sign_at(&raw, now);
        CsrfTokenPair { raw, signed }
    }

    /// Pull the raw token out of the configured header
    pub fn extract_from_headers(&self, headers: &HeaderMap) -> Result<String, CsrfError> {
        let value = headers.get(self.header_name.as_str()).ok_or_else(|| {
            CsrfError::MissingHeader(format!(
                "Bad headers. Expected \"{}\" in headers",
                self.header_name
            ))
        })?;

        let bad_format = || {
            let expected = match &self.header_type {
                Some(kind) => format!("{kind} <Token>"),
                None => "<Token>".to_string(),
            };
            CsrfError::InvalidHeaderFormat(format!(
                "Bad {} header. Expected \"{expected}\"",
                self.header_name
            ))
        };

        let value = value.to_str().map_err(|_| bad_format())?;
        let parts: Vec<&str> = value.split_whitespace().collect();

        match (&self.header_type, parts.as_slice()) {
            (None, [token]) => Ok((*token).to_string()),
            (Some(kind), [prefix, token]) if *prefix == kind.as_str() => Ok((*token).to_string()),
            _ => Err(bad_format()),
        }
    }

    pub fn validate(&self, headers: &HeaderMap) -> Result<(), CsrfError> {
        self.validate_at(headers, Utc::now().timestamp())
    }

    /// Check the cookie/header pair as if the current time were `now`
    pub fn validate_at(&self, headers: &HeaderMap, now: i64) -> Result<(), CsrfError> {
        let signed = extract_cookie(headers, &self.cookie.name).ok_or_else(|| {
            CsrfError::MissingToken(format!("Missing Cookie: `{}`.", self.cookie.name))
        })?;

        let submitted = self.extract_from_headers(headers)?;

        let expected = self
            .signer
            .verify_at(&signed, self.max_age, now)
            .map_err(|e| match e {
                SignatureError::Expired => {
                    CsrfError::TokenValidation("The CSRF token has expired.".to_string())
                }
                SignatureError::BadSignature => {
                    CsrfError::TokenValidation("The CSRF token is invalid.".to_string())
                }
            })?;

        if !constant_time_eq(expected.as_bytes(), submitted.as_bytes()) {
            return Err(CsrfError::TokenValidation(
                "The CSRF signatures submitted do not match.".to_string(),
            ));
        }

        Ok(())
    }

    /// Set-Cookie value carrying the signed half
    pub fn set_cookie(&self, signed: &str) -> HeaderValue {
        set_cookie_header(&self.cookie, signed)
    }

    /// Set-Cookie value clearing the signed half
    pub fn unset_cookie(&self) -> HeaderValue {
        delete_cookie_header(&self.cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::{SameSite, TokenLocation};
    use axum::http::header;
    use platform::signed::SigningKey;

    const T0: i64 = 1_760_000_000;

    fn config(header_type: Option<&str>) -> CsrfConfig {
        CsrfConfig {
            secret: SigningKey::new("csrf-secret").unwrap(),
            salt: "csrf-salt".to_string(),
            cookie: CookieConfig {
                name: "csrf-token".to_string(),
                path: "/".to_string(),
                domain: Some("shop.example".to_string()),
                secure: true,
                http_only: true,
                same_site: SameSite::Strict,
                max_age_secs: Some(3600),
            },
            max_age: Duration::from_secs(3600),
            header_name: "X-CSRF-Token".to_string(),
            header_type: header_type.map(str::to_string),
            token_location: TokenLocation::Header,
        }
    }

    fn request(cookie: Option<&str>, header_value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(signed) = cookie {
            headers.insert(
                header::COOKIE,
                HeaderValue::from_str(&format!("theme=dark; csrf-token={signed}")).unwrap(),
            );
        }
        if let Some(value) = header_value {
            headers.insert("x-csrf-token", HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_raw_token_shape() {
        let guard = CsrfGuard::new(&config(None));
        let a = guard.generate_tokens();
        let b = guard.generate_tokens();

        assert_eq!(a.raw.len(), 40);
        assert!(a.raw.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.raw, b.raw);
        assert_ne!(a.raw, a.signed);
    }

    #[test]
    fn test_issued_pair_validates() {
        let guard = CsrfGuard::new(&config(None));
        let pair = guard.generate_tokens_at(T0);

        let headers = request(Some(&pair.signed), Some(&pair.raw));
        assert_eq!(guard.validate_at(&headers, T0 + 10), Ok(()));

        let pair = guard.generate_tokens();
        assert_eq!(
            guard.validate(&request(Some(&pair.signed), Some(&pair.raw))),
            Ok(())
        );
    }

    #[test]
    fn test_header_from_another_pair_fails() {
        let guard = CsrfGuard::new(&config(None));
        let first = guard.generate_tokens_at(T0);
        let second = guard.generate_tokens_at(T0);

        let headers = request(Some(&first.signed), Some(&second.raw));
        assert_eq!(
            guard.validate_at(&headers, T0),
            Err(CsrfError::TokenValidation(
                "The CSRF signatures submitted do not match.".to_string()
            ))
        );
    }

    #[test]
    fn test_missing_cookie_checked_before_header() {
        let guard = CsrfGuard::new(&config(None));
        let err = guard.validate_at(&request(None, None), T0).unwrap_err();
        assert!(matches!(err, CsrfError::MissingToken(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_header() {
        let guard = CsrfGuard::new(&config(None));
        let pair = guard.generate_tokens_at(T0);

        let err = guard
            .validate_at(&request(Some(&pair.signed), None), T0)
            .unwrap_err();
        assert!(matches!(err, CsrfError::MissingHeader(_)));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_header_format_without_type() {
        let guard = CsrfGuard::new(&config(None));

        let ok = request(None, Some("  abc  "));
        assert_eq!(guard.extract_from_headers(&ok).unwrap(), "abc");

        for bad in ["", "Bearer abc", "a b c"] {
            let err = guard
                .extract_from_headers(&request(None, Some(bad)))
                .unwrap_err();
            assert!(matches!(err, CsrfError::InvalidHeaderFormat(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_header_format_with_type() {
        let guard = CsrfGuard::new(&config(Some("Bearer")));

        let ok = request(None, Some("Bearer abc"));
        assert_eq!(guard.extract_from_headers(&ok).unwrap(), "abc");

        for bad in ["abc", "Token abc", "bearer abc", "Bearer a b"] {
            let err = guard
                .extract_from_headers(&request(None, Some(bad)))
                .unwrap_err();
            assert_eq!(
                err,
                CsrfError::InvalidHeaderFormat(
                    "Bad X-CSRF-Token header. Expected \"Bearer <Token>\"".to_string()
                ),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_expired_and_tampered_cookie() {
        let guard = CsrfGuard::new(&config(None));
        let pair = guard.generate_tokens_at(T0);

        let headers = request(Some(&pair.signed), Some(&pair.raw));
        assert_eq!(
            guard.validate_at(&headers, T0 + 3601),
            Err(CsrfError::TokenValidation(
                "The CSRF token has expired.".to_string()
            ))
        );

        let forged = format!("{}x", pair.signed);
        let headers = request(Some(&forged), Some(&pair.raw));
        let err = guard.validate_at(&headers, T0).unwrap_err();
        assert_eq!(
            err,
            CsrfError::TokenValidation("The CSRF token is invalid.".to_string())
        );
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_cookie_set_and_unset_share_scope() {
        let guard = CsrfGuard::new(&config(None));

        let set = guard.set_cookie("signed-value");
        let set = set.to_str().unwrap();
        assert!(set.starts_with("csrf-token=signed-value"));
        assert!(set.contains("Max-Age=3600"));

        let unset = guard.unset_cookie();
        let unset = unset.to_str().unwrap();
        assert!(unset.starts_with("csrf-token=;"));
        assert!(unset.contains("Max-Age=0"));

        for attr in ["Path=/", "Domain=shop.example", "HttpOnly", "Secure", "SameSite=Strict"] {
            assert!(set.contains(attr), "{attr} missing on set");
            assert!(unset.contains(attr), "{attr} missing on unset");
        }
    }
}
