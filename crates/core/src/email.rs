//! Email address value object.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A normalized (trimmed, lower-cased) email address.
///
/// Validation is deliberately shallow: a non-empty local part, exactly one `@`,
/// and a dotted domain without empty labels. Deliverability is the mail
/// provider's problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(DomainError::invalid_email("address cannot be blank"));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(DomainError::invalid_email(format!("{normalized}: contains whitespace")));
        }

        let (local, domain) = normalized
            .split_once('@')
            .ok_or_else(|| DomainError::invalid_email(format!("{normalized}: missing '@'")))?;

        if local.is_empty() || domain.contains('@') {
            return Err(DomainError::invalid_email(format!("{normalized}: malformed local part")));
        }
        if !domain.contains('.') || domain.split('.').any(str::is_empty) {
            return Err(DomainError::invalid_email(format!("{normalized}: malformed domain")));
        }

        Ok(Self(normalized))
    }

    /// Parse a comma-separated list (the shape used by env configuration).
    ///
    /// Blank entries are ignored; duplicates collapse to the first occurrence.
    pub fn parse_list(raw: &str) -> DomainResult<Vec<Self>> {
        let mut out: Vec<Self> = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let email = Self::parse(part)?;
            if !out.contains(&email) {
                out.push(email);
            }
        }
        Ok(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for EmailAddress {}

impl core::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for EmailAddress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}
