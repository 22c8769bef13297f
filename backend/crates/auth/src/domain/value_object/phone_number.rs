//! Phone Number Value Object
//!
//! `+` followed by 1 to 15 ASCII digits (E.164 upper bound).

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const MAX_DIGITS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let raw = raw.as_ref();
        let valid = raw.strip_prefix('+').is_some_and(|digits| {
            (1..=MAX_DIGITS).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
        });

        if !valid {
            return Err(AppError::unprocessable(
                "Phone number should start with '+' followed by 1 to 15 digits",
            ));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        PhoneNumber::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_numbers() {
        for raw in ["+1", "+79991234567", "+123456789012345"] {
            assert!(PhoneNumber::new(raw).is_ok(), "{raw}");
        }
    }

    #[test]
    fn test_invalid_numbers() {
        for raw in [
            "",
            "+",
            "79991234567",
            "+1234567890123456",
            "+7 999 123",
            "+7-999",
            "++7",
            "+٣٤٥",
        ] {
            assert!(PhoneNumber::new(raw).is_err(), "{raw}");
        }
    }
}
