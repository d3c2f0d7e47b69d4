//! Seller username rules
//!
//! Letters, digits and `@ . + - _`, at most 50 characters after trimming.
//! [`Username`] can only be built through these checks.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} may not be blank")]
    Blank { field: &'static str },

    #[error("{field} has {actual} characters, at most {max} allowed")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} contains '{ch}' at position {position}; letters, digits and @/./+/-/_ only")]
    InvalidChar {
        field: &'static str,
        ch: char,
        position: usize,
    },
}

/// Validated seller username
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub const MAX_LEN: usize = 50;
    const FIELD: &'static str = "username";

    /// ```
    /// use credit_exchange::seller::validation::{Username, ValidationError};
    ///
    /// assert_eq!(Username::new(" test1 ").unwrap().as_str(), "test1");
    /// assert!(matches!(
    ///     Username::new("bad name"),
    ///     Err(ValidationError::InvalidChar { ch: ' ', position: 3, .. })
    /// ));
    /// ```
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValidationError::Blank { field: Self::FIELD });
        }

        let mut count = 0;
        for (position, ch) in name.chars().enumerate() {
            if !Self::allowed(ch) {
                return Err(ValidationError::InvalidChar {
                    field: Self::FIELD,
                    ch,
                    position,
                });
            }
            count = position + 1;
        }
        if count > Self::MAX_LEN {
            return Err(ValidationError::TooLong {
                field: Self::FIELD,
                max: Self::MAX_LEN,
                actual: count,
            });
        }

        Ok(Self(name.to_string()))
    }

    fn allowed(ch: char) -> bool {
        ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for Username {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_django_style_names() {
        for name in ["test1", "a", "seller.one+shop@example-1_a", "ünïcode"] {
            assert_eq!(name.parse::<Username>().unwrap().as_str(), name);
        }
        assert_eq!(Username::new("\tpadded  ").unwrap().into_string(), "padded");
    }

    #[test]
    fn test_blank() {
        assert_eq!(
            Username::new("   "),
            Err(ValidationError::Blank { field: "username" })
        );
    }

    #[test]
    fn test_length_limit_counts_chars() {
        assert!(Username::new(&"x".repeat(50)).is_ok());
        assert_eq!(
            Username::new(&"x".repeat(51)),
            Err(ValidationError::TooLong {
                field: "username",
                max: 50,
                actual: 51
            })
        );
        // 50 two-byte chars are still 50 characters
        assert!(Username::new(&"é".repeat(50)).is_ok());
    }

    #[test]
    fn test_reports_first_bad_char() {
        assert_eq!(
            Username::new("semi;colon"),
            Err(ValidationError::InvalidChar {
                field: "username",
                ch: ';',
                position: 4
            })
        );
        let msg = Username::new("a b").unwrap_err().to_string();
        assert!(msg.contains("position 1"), "{msg}");
    }
}
