//! Cookie Management Infrastructure
//!
//! Set-Cookie building and Cookie header parsing.

use std::str::FromStr;

use axum::http::{HeaderMap, HeaderValue, header};
use thiserror::Error;

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid SameSite value '{0}' (expected lax, strict or none)")]
pub struct ParseSameSiteError(String);

impl FromStr for SameSite {
    type Err = ParseSameSiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            _ => Err(ParseSameSiteError(s.to_string())),
        }
    }
}

/// Cookie attributes
///
/// The same value is used to set and to delete a cookie; browsers only
/// drop a cookie when path, domain, Secure, HttpOnly and SameSite match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub max_age_secs: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            max_age_secs: None,
        }
    }
}

impl CookieConfig {
    /// Build Set-Cookie header value
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}", self.name, value);
        if let Some(max_age) = self.max_age_secs {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }
        self.push_scope_attributes(&mut cookie);
        cookie
    }

    /// Build Set-Cookie header for deletion (expired), mirroring every
    /// scope attribute used when the cookie was set
    pub fn build_delete_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name
        );
        self.push_scope_attributes(&mut cookie);
        cookie
    }

    fn push_scope_attributes(&self, cookie: &mut String) {
        cookie.push_str(&format!("; Path={}", self.path));
        if let Some(domain) = &self.domain {
            cookie.push_str(&format!("; Domain={}", domain));
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));
    }
}

/// Extract a cookie value from headers (all `Cookie` headers are searched)
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;

            if key == name {
                Some(value.to_string())
            } else {
                None
            }
        })
}

/// Create a Set-Cookie header value
pub fn set_cookie_header(config: &CookieConfig, value: &str) -> HeaderValue {
    to_header_value(config.build_set_cookie(value))
}

/// Create a Set-Cookie header value that deletes the cookie
pub fn delete_cookie_header(config: &CookieConfig) -> HeaderValue {
    to_header_value(config.build_delete_cookie())
}

fn to_header_value(cookie: String) -> HeaderValue {
    HeaderValue::from_str(&cookie).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Refusing to emit invalid Set-Cookie header");
        HeaderValue::from_static("")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CookieConfig {
        CookieConfig {
            name: "csrf-token".to_string(),
            path: "/api".to_string(),
            domain: Some("shop.example".to_string()),
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
            max_age_secs: Some(3600),
        }
    }

    #[test]
    fn test_cookie_config_build() {
        let cookie = config().build_set_cookie("value123");
        assert!(cookie.starts_with("csrf-token=value123"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("Path=/api"));
        assert!(cookie.contains("Domain=shop.example"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    #[test]
    fn test_delete_cookie_mirrors_scope() {
        let cfg = config();
        let set = cfg.build_set_cookie("v");
        let delete = cfg.build_delete_cookie();

        assert!(delete.starts_with("csrf-token=;"));
        assert!(delete.contains("Max-Age=0"));
        for attr in ["Path=/api", "Domain=shop.example", "HttpOnly", "Secure", "SameSite=Strict"] {
            assert!(set.contains(attr));
            assert!(delete.contains(attr), "delete cookie missing {attr}");
        }
    }

    #[test]
    fn test_optional_attributes_omitted() {
        let cfg = CookieConfig {
            name: "c".to_string(),
            domain: None,
            secure: false,
            http_only: false,
            max_age_secs: None,
            ..CookieConfig::default()
        };
        let cookie = cfg.build_set_cookie("v");
        assert_eq!(cookie, "c=v; Path=/; SameSite=Lax");
    }

    #[test]
    fn test_same_site_parse() {
        assert_eq!("strict".parse::<SameSite>().unwrap(), SameSite::Strict);
        assert_eq!("Lax".parse::<SameSite>().unwrap(), SameSite::Lax);
        assert_eq!("NONE".parse::<SameSite>().unwrap(), SameSite::None);
        assert!("sometimes".parse::<SameSite>().is_err());
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; session=abc123; other=xyz"),
        );
        headers.append(header::COOKIE, HeaderValue::from_static("late=1"));

        assert_eq!(
            extract_cookie(&headers, "session"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "late"), Some("1".to_string()));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }
}
