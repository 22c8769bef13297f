//! Access Token Issuer/Verifier
//!
//! Stateless HMAC-signed JWTs (HS256/384/512). Claims: `sub` (user name),
//! optional `role` and `device`, `exp`, `iat`.
//!
//! Expiry is checked here rather than by `jsonwebtoken`, so a token is dead
//! once `exp <= now` (no leeway), and a token without `exp` is reported as
//! expired rather than malformed.

use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::application::config::AccessTokenConfig;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

pub const TOKEN_TYPE: &str = "Bearer";

/// Identity to embed in a new token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub user_name: String,
    pub role: Option<UserRole>,
    /// Informational only; not compared on verification
    pub device: Option<String>,
}

/// Verified token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Wire shape before the required-claim checks
#[derive(Deserialize)]
struct RawClaims {
    sub: Option<String>,
    role: Option<String>,
    device: Option<String>,
    exp: Option<i64>,
    iat: Option<i64>,
}

#[derive(Clone)]
pub struct AccessTokenService {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AccessTokenService {
    pub fn new(config: &AccessTokenConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            header: Header::new(config.algorithm),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token valid for `ttl_minutes` from now
    pub fn issue(&self, subject: &Subject, ttl_minutes: i64) -> AuthResult<String> {
        self.issue_at(subject, ttl_minutes, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds)
    pub fn issue_at(&self, subject: &Subject, ttl_minutes: i64, now: i64) -> AuthResult<String> {
        let claims = Claims {
            sub: subject.user_name.clone(),
            role: subject.role.map(|r| r.code().to_string()),
            device: subject.device.clone(),
            exp: now.saturating_add(ttl_minutes.saturating_mul(60)),
            iat: now,
        };

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify signature and claims as if the current time were `now`
    pub fn verify_at(&self, token: &str, now: i64) -> AuthResult<Claims> {
        let raw = decode::<RawClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                AuthError::InvalidToken
            })?
            .claims;

        let sub = raw
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::InvalidToken)?;
        let exp = raw.exp.ok_or(AuthError::ExpiredToken)?;
        if exp <= now {
            return Err(AuthError::ExpiredToken);
        }

        Ok(Claims {
            sub,
            role: raw.role,
            device: raw.device,
            exp,
            iat: raw.iat.unwrap_or(exp),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::Algorithm;
    use platform::signed::SigningKey;

    const NOW: i64 = 1_760_000_000;

    fn service(secret: &str, algorithm: Algorithm) -> AccessTokenService {
        AccessTokenService::new(&AccessTokenConfig {
            secret: SigningKey::new(secret).unwrap(),
            algorithm,
            ttl_minutes: 1440,
            cookie_name: "access_token".to_string(),
        })
    }

    fn alice() -> Subject {
        Subject {
            user_name: "alice".to_string(),
            role: Some(UserRole::Merchant),
            device: Some("curl/8.0:10.0.0.1".to_string()),
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let svc = service("jwt-secret", Algorithm::HS256);
        let token = svc.issue_at(&alice(), 15, NOW).unwrap();

        let claims = svc.verify_at(&token, NOW + 60).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role.as_deref(), Some("merchant"));
        assert_eq!(claims.device.as_deref(), Some("curl/8.0:10.0.0.1"));
        assert_eq!(claims.exp, NOW + 15 * 60);
        assert_eq!(claims.iat, NOW);
    }

    #[test]
    fn test_verify_against_wall_clock() {
        let svc = service("jwt-secret", Algorithm::HS256);
        let token = svc.issue(&alice(), 5).unwrap();
        assert_eq!(svc.verify(&token).unwrap().sub, "alice");
    }

    #[test]
    fn test_zero_ttl_is_already_expired() {
        let svc = service("jwt-secret", Algorithm::HS256);
        let token = svc.issue_at(&alice(), 0, NOW).unwrap();
        assert!(matches!(
            svc.verify_at(&token, NOW),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_expiry_boundary() {
        let svc = service("jwt-secret", Algorithm::HS256);
        let token = svc.issue_at(&alice(), 1, NOW).unwrap();
        assert!(svc.verify_at(&token, NOW + 59).is_ok());
        assert!(matches!(
            svc.verify_at(&token, NOW + 60),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_wrong_secret_or_algorithm_is_invalid() {
        let token = service("jwt-secret", Algorithm::HS256)
            .issue_at(&alice(), 15, NOW)
            .unwrap();

        assert!(matches!(
            service("other-secret", Algorithm::HS256).verify_at(&token, NOW),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            service("jwt-secret", Algorithm::HS384).verify_at(&token, NOW),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_or_malformed_is_invalid() {
        let svc = service("jwt-secret", Algorithm::HS256);
        let token = svc.issue_at(&alice(), 15, NOW).unwrap();
        let mut tampered = token.clone();
        let last = if tampered.ends_with('A') { 'B' } else { 'A' };
        tampered.pop();
        tampered.push(last);

        for bad in [tampered.as_str(), "", "not.a.jwt", "a.b"] {
            assert!(
                matches!(svc.verify_at(bad, NOW), Err(AuthError::InvalidToken)),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_missing_subject_is_invalid_missing_exp_is_expired() {
        #[derive(Serialize)]
        struct Partial<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            sub: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            exp: Option<i64>,
        }

        fn sign(claims: &Partial<'_>) -> String {
            let key = EncodingKey::from_secret(b"jwt-secret");
            encode(&Header::default(), claims, &key).unwrap()
        }

        let svc = service("jwt-secret", Algorithm::HS256);

        let no_sub = sign(&Partial { sub: None, exp: Some(NOW + 600) });
        assert!(matches!(svc.verify_at(&no_sub, NOW), Err(AuthError::InvalidToken)));

        let empty_sub = sign(&Partial { sub: Some(""), exp: Some(NOW + 600) });
        assert!(matches!(svc.verify_at(&empty_sub, NOW), Err(AuthError::InvalidToken)));

        let no_exp = sign(&Partial { sub: Some("alice"), exp: None });
        assert!(matches!(svc.verify_at(&no_exp, NOW), Err(AuthError::ExpiredToken)));
    }
}
