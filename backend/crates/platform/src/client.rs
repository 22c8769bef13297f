//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

const UNKNOWN: &str = "unknown";

/// Device fingerprint stamped into issued access tokens
///
/// Rendered as `"<user-agent>:<client-ip>"`, with `unknown` standing in for
/// whichever part the request did not provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFingerprint {
    pub user_agent: Option<String>,
    pub ip: Option<IpAddr>,
}

impl DeviceFingerprint {
    pub fn new(user_agent: Option<String>, ip: Option<IpAddr>) -> Self {
        Self { user_agent, ip }
    }

    /// Read the fingerprint from request headers and the peer address
    pub fn from_request(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Self {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self::new(user_agent, extract_client_ip(headers, direct_ip))
    }
}

impl std::fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ua = self.user_agent.as_deref().unwrap_or(UNKNOWN);
        match self.ip {
            Some(ip) => write!(f, "{ua}:{ip}"),
            None => write!(f, "{ua}:{UNKNOWN}"),
        }
    }
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    // First entry is the originating client
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok())
        && let Some(first_ip) = xff.split(',').next()
        && let Ok(ip) = first_ip.trim().parse::<IpAddr>()
    {
        return Some(ip);
    }
    direct_ip
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_fingerprint_from_request() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 Test Browser"),
        );

        let fp = DeviceFingerprint::from_request(&headers, Some("10.1.2.3".parse().unwrap()));
        assert_eq!(fp.to_string(), "Mozilla/5.0 Test Browser:10.1.2.3");
    }

    #[test]
    fn test_fingerprint_missing_parts() {
        let fp = DeviceFingerprint::from_request(&HeaderMap::new(), None);
        assert_eq!(fp.to_string(), "unknown:unknown");
    }

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_bad_xff_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        assert_eq!(extract_client_ip(&headers, Some(direct)), Some(direct));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let headers = HeaderMap::new();
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }
}
