//! Author identity primitives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Characters of the user id shown in author labels.
pub const AUTHOR_LABEL_CHARS: usize = 8;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdValidationError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    Empty,
    /// The identifier had surrounding whitespace or control characters.
    #[error("user id must not contain whitespace or control characters")]
    InvalidCharacters,
}

/// Identifier the hosted auth service assigns to a user, anonymous or not.
///
/// The service issues UUIDs, but posts only ever compare author ids for
/// equality, so the value is kept opaque.
///
/// # Examples
/// ```
/// use fictures::domain::UserId;
///
/// let id = UserId::new("31b78f13-bb9f-44bc-96b5-21dae295d537").expect("valid id");
/// assert_eq!(id.author_label(), "Anonymous #31b78f13");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Errors
    /// Rejects empty values and values containing whitespace or control
    /// characters.
    pub fn new(id: impl Into<String>) -> Result<Self, UserIdValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(UserIdValidationError::Empty);
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(UserIdValidationError::InvalidCharacters);
        }
        Ok(Self(id))
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Public label shown next to posts: `Anonymous #` and the first eight
    /// characters of the id.
    #[must_use]
    pub fn author_label(&self) -> String {
        let prefix: String = self.0.chars().take(AUTHOR_LABEL_CHARS).collect();
        format!("Anonymous #{prefix}")
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserIdValidationError::Empty)]
    #[case(" abc", UserIdValidationError::InvalidCharacters)]
    #[case("a\tb", UserIdValidationError::InvalidCharacters)]
    fn rejects_malformed_ids(#[case] raw: &str, #[case] expected: UserIdValidationError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[rstest]
    #[case("abc123", "Anonymous #abc123")]
    #[case("31b78f13-bb9f-44bc-96b5-21dae295d537", "Anonymous #31b78f13")]
    fn author_label_uses_id_prefix(#[case] raw: &str, #[case] label: &str) {
        let id = UserId::new(raw).expect("valid id");
        assert_eq!(id.author_label(), label);
    }

    #[rstest]
    fn deserialisation_validates() {
        let ok: UserId = serde_json::from_str("\"abc123\"").expect("valid id");
        assert_eq!(ok.as_str(), "abc123");
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }
}
