//! Signed Token Codec
//!
//! Wraps a string payload with an issue timestamp and an HMAC-SHA256
//! signature, producing a URL-safe token:
//!
//! ```text
//! base64url(payload) "." base64url(issued_at_be) "." base64url(hmac)
//! ```
//!
//! The HMAC key is derived from the secret and a salt, so the same secret
//! used under two salts yields two signers that reject each other's tokens.
//!
//! ## Verification order
//! 1. Structure and signature (constant-time) - failure is `BadSignature`
//! 2. Age against `max_age` - failure is `Expired`
//! 3. Payload decoding
//!
//! The timestamp is only trusted once the signature has been checked.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};

const SEPARATOR: char = '.';

/// Errors when building a signing key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningKeyError {
    #[error("signing secret must not be empty")]
    Empty,
}

/// Verification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Signature valid, but older than the allowed age (or issued in the future)
    #[error("signature expired")]
    Expired,

    /// Structure malformed or signature mismatch
    #[error("bad signature")]
    BadSignature,
}

/// Secret signing material, zeroized on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, SigningKeyError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(SigningKeyError::Empty);
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for SigningKey {
    fn eq(&self, other: &Self) -> bool {
        crate::crypto::constant_time_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningKey").field(&"[REDACTED]").finish()
    }
}

/// Timestamped signer bound to one secret + salt namespace
#[derive(Clone)]
pub struct TimedSigner {
    derived_key: SigningKey,
}

impl TimedSigner {
    pub fn new(secret: &SigningKey, salt: &str) -> Self {
        let derived = hmac_sha256(secret.as_bytes(), salt.as_bytes());
        Self {
            derived_key: SigningKey(derived.to_vec()),
        }
    }

    /// Sign `payload` stamped with the current time
    pub fn sign(&self, payload: &str) -> String {
        self.sign_at(payload, Utc::now().timestamp())
    }

    /// Sign `payload` stamped with `issued_at` (unix seconds)
    pub fn sign_at(&self, payload: &str, issued_at: i64) -> String {
        let value = format!(
            "{}{SEPARATOR}{}",
            to_base64url(payload.as_bytes()),
            to_base64url(&issued_at.to_be_bytes())
        );
        let signature = hmac_sha256(self.derived_key.as_bytes(), value.as_bytes());
        format!("{value}{SEPARATOR}{}", to_base64url(&signature))
    }

    /// Verify `token` against the current time
    pub fn verify(&self, token: &str, max_age: Duration) -> Result<String, SignatureError> {
        self.verify_at(token, max_age, Utc::now().timestamp())
    }

    /// Verify `token` as if the current time were `now` (unix seconds)
    pub fn verify_at(
        &self,
        token: &str,
        max_age: Duration,
        now: i64,
    ) -> Result<String, SignatureError> {
        let (value, signature_b64) = token
            .rsplit_once(SEPARATOR)
            .ok_or(SignatureError::BadSignature)?;

        let signature = from_base64url(signature_b64).map_err(|_| SignatureError::BadSignature)?;

        if !verify_hmac_sha256(self.derived_key.as_bytes(), value.as_bytes(), &signature) {
            return Err(SignatureError::BadSignature);
        }

        let (payload_b64, timestamp_b64) = value
            .split_once(SEPARATOR)
            .ok_or(SignatureError::BadSignature)?;

        let timestamp_bytes: [u8; 8] = from_base64url(timestamp_b64)
            .map_err(|_| SignatureError::BadSignature)?
            .try_into()
            .map_err(|_| SignatureError::BadSignature)?;
        let issued_at = i64::from_be_bytes(timestamp_bytes);

        let age = now.saturating_sub(issued_at);
        let max_age_secs = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        if age < 0 || age > max_age_secs {
            return Err(SignatureError::Expired);
        }

        let payload = from_base64url(payload_b64).map_err(|_| SignatureError::BadSignature)?;
        String::from_utf8(payload).map_err(|_| SignatureError::BadSignature)
    }
}

impl fmt::Debug for TimedSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);
    const T0: i64 = 1_760_000_000;

    fn signer(secret: &str, salt: &str) -> TimedSigner {
        TimedSigner::new(&SigningKey::new(secret).unwrap(), salt)
    }

    #[test]
    fn test_roundtrip_within_max_age() {
        let s = signer("secret", "salt");
        let token = s.sign_at("alice@x.com", T0);

        for elapsed in [0, 1, 59, 60] {
            assert_eq!(
                s.verify_at(&token, MINUTE, T0 + elapsed).unwrap(),
                "alice@x.com"
            );
        }
    }

    #[test]
    fn test_sign_then_verify_now() {
        let s = signer("secret", "salt");
        let token = s.sign("payload with spaces and ünïcode");
        assert_eq!(
            s.verify(&token, MINUTE).unwrap(),
            "payload with spaces and ünïcode"
        );
    }

    #[test]
    fn test_expired_after_max_age() {
        let s = signer("secret", "salt");
        let token = s.sign_at("alice@x.com", T0);

        assert_eq!(
            s.verify_at(&token, MINUTE, T0 + 61),
            Err(SignatureError::Expired)
        );
        assert_eq!(
            s.verify_at(&token, MINUTE, T0 + 86_400),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn test_issued_in_future_is_expired() {
        let s = signer("secret", "salt");
        let token = s.sign_at("alice@x.com", T0 + 10);
        assert_eq!(s.verify_at(&token, MINUTE, T0), Err(SignatureError::Expired));
    }

    #[test]
    fn test_flipping_any_signature_char_is_rejected() {
        let s = signer("secret", "salt");
        let token = s.sign_at("alice@x.com", T0);
        let sig_start = token.rfind(SEPARATOR).unwrap() + 1;

        for i in sig_start..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            assert_eq!(
                s.verify_at(&tampered, MINUTE, T0),
                Err(SignatureError::BadSignature),
                "tampered position {i} accepted"
            );
        }
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let s = signer("secret", "salt");
        let token = s.sign_at("alice@x.com", T0);
        let (_, rest) = token.split_once(SEPARATOR).unwrap();
        let forged = format!("{}.{}", to_base64url(b"bob@x.com"), rest);

        assert_eq!(
            s.verify_at(&forged, MINUTE, T0),
            Err(SignatureError::BadSignature)
        );
    }

    #[test]
    fn test_salt_and_secret_scope_tokens() {
        let token = signer("secret", "register").sign_at("alice@x.com", T0);

        assert_eq!(
            signer("secret", "recover").verify_at(&token, MINUTE, T0),
            Err(SignatureError::BadSignature)
        );
        assert_eq!(
            signer("other", "register").verify_at(&token, MINUTE, T0),
            Err(SignatureError::BadSignature)
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let s = signer("secret", "salt");
        for garbage in ["", "abc", "a.b", "a.b.c", "...", "!!.!!.!!"] {
            assert_eq!(
                s.verify_at(garbage, MINUTE, T0),
                Err(SignatureError::BadSignature),
                "{garbage:?}"
            );
        }
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert_eq!(SigningKey::new(""), Err(SigningKeyError::Empty));
    }

    #[test]
    fn test_key_debug_redacted() {
        let key = SigningKey::new("super-secret").unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("super-secret"));
    }
}
