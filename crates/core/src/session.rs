use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};

/// Opaque bearer token retrieved from session storage.
///
/// The token value is never printed; `Debug` redacts it so request tracing
/// cannot leak credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw bearer-token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token for request authorization headers.
    #[must_use]
    pub fn reveal(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for SessionToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("SessionToken(..)")
    }
}

/// Account information returned by the current-user endpoint.
///
/// The `role` field is the raw server value; it is normalized into the closed
/// role set exactly once, at the session boundary, and never compared as a
/// string anywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    user_name: String,
    email: Option<String>,
    role: String,
}

impl UserProfile {
    /// Creates a user profile from current-user endpoint data.
    #[must_use]
    pub fn new(
        user_name: impl Into<String>,
        email: Option<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            email,
            role: role.into(),
        }
    }

    /// Returns the display name for the signed-in user.
    #[must_use]
    pub fn user_name(&self) -> &str {
        self.user_name.as_str()
    }

    /// Returns the email, if the backend returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the raw, un-normalized role value.
    #[must_use]
    pub fn raw_role(&self) -> &str {
        self.role.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::SessionToken;

    #[test]
    fn token_debug_output_is_redacted() {
        let token = SessionToken::new("secret-bearer-value");
        assert_eq!(format!("{token:?}"), "SessionToken(..)");
    }
}
