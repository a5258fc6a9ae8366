//! Scan target abstraction.

use crate::core::error::DomainError;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A syntactically valid scan target.
///
/// The check is shallow. The value must be non-empty, must not contain
/// whitespace, must not start with `-` and must contain at least one `.`
/// separator. Anything that passes is handed to the external tools as a
/// positional argument, so a leading `-` is never let through.
///
/// # Examples
///
/// ```rust
/// use reconbridge::Domain;
///
/// let domain = Domain::parse("example.com").unwrap();
/// assert_eq!(domain.as_str(), "example.com");
///
/// assert!(Domain::parse("localhost").is_err());
/// assert!(Domain::parse("bad domain.com").is_err());
/// assert!(Domain::parse("-oN/tmp/out.txt").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

impl Domain {
    /// Validates and wraps a domain string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(DomainError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(DomainError::ContainsWhitespace(raw));
        }
        if raw.starts_with('-') {
            return Err(DomainError::LeadingHyphen(raw));
        }
        if !raw.contains('.') {
            return Err(DomainError::MissingSeparator(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the domain as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the domain, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Domain {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for Domain {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}
