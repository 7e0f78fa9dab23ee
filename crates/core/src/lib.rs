//! Shared primitives for all Rust crates in Evaldesk.

#![forbid(unsafe_code)]

/// Session primitives shared across services.
pub mod session;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use session::{SessionToken, UserProfile};

/// Result type used across Evaldesk crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant, detected before any network call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation conflicts with existing state or an in-flight request.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Session is missing, expired, or rejected by the backend.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Viewer is authenticated but blocked by capability policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Transport failure or non-success response from a collaborator.
    #[error("network error: {0}")]
    Network(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::NonEmptyString;

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn non_empty_string_keeps_inner_value() {
        let value = NonEmptyString::new("curation note");
        assert!(value.is_ok());
        assert_eq!(
            value.map(|inner| String::from(inner)).unwrap_or_default(),
            "curation note"
        );
    }
}
