use std::sync::RwLock;

use evaldesk_application::SessionTokenStore;
use evaldesk_core::SessionToken;

/// Process-local session storage for the bearer token.
#[derive(Debug, Default)]
pub struct InMemorySessionTokenStore {
    token: RwLock<Option<SessionToken>>,
}

impl InMemorySessionTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given token.
    #[must_use]
    pub fn with_token(token: SessionToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

impl SessionTokenStore for InMemorySessionTokenStore {
    fn load(&self) -> Option<SessionToken> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn store(&self, token: SessionToken) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token);
    }

    fn clear(&self) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use evaldesk_application::SessionTokenStore;
    use evaldesk_core::SessionToken;

    use super::InMemorySessionTokenStore;

    #[test]
    fn clear_drops_the_stored_token() {
        let store = InMemorySessionTokenStore::with_token(SessionToken::new("bearer"));
        assert!(store.load().is_some());

        store.clear();
        assert!(store.load().is_none());
    }
}
