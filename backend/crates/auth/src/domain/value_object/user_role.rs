use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Account role, carried in the `role` claim of access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    #[display("user")]
    User,
    #[display("merchant")]
    Merchant,
    #[display("moderator")]
    Moderator,
    #[display("admin")]
    Admin,
}

impl UserRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "user",
            Merchant => "merchant",
            Moderator => "moderator",
            Admin => "admin",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code {
            "user" => Some(User),
            "merchant" => Some(Merchant),
            "moderator" => Some(Moderator),
            "admin" => Some(Admin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for role in [
            UserRole::User,
            UserRole::Merchant,
            UserRole::Moderator,
            UserRole::Admin,
        ] {
            assert_eq!(UserRole::from_code(role.code()), Some(role));
            assert_eq!(role.to_string(), role.code());
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(UserRole::from_code("super_admin"), None);
        assert_eq!(UserRole::from_code("Admin"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserRole::Merchant).unwrap(),
            "\"merchant\""
        );
    }
}
