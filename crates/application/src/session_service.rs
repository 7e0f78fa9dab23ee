use std::sync::Arc;

use evaldesk_core::{AppError, AppResult, UserProfile};
use evaldesk_domain::{CapabilitySet, Role};
use tokio::sync::RwLock;
use tracing::info;

use crate::{CurrentUserGateway, Notice, Notifier, SessionTokenStore};

/// Explicit session context for one page or dialog session.
///
/// Resolves the signed-in user once, normalizes the raw role value into the
/// closed role set at this boundary, and caches the result for the session's
/// lifetime. A 401 from the backend destroys the session: the stored token
/// is cleared and a session-expired notice is emitted.
#[derive(Clone)]
pub struct SessionService {
    token_store: Arc<dyn SessionTokenStore>,
    users: Arc<dyn CurrentUserGateway>,
    notifier: Arc<dyn Notifier>,
    resolved: Arc<RwLock<Option<ResolvedSession>>>,
}

#[derive(Debug, Clone)]
struct ResolvedSession {
    profile: UserProfile,
    role: Option<Role>,
}

impl SessionService {
    /// Creates a session service over the given collaborators.
    #[must_use]
    pub fn new(
        token_store: Arc<dyn SessionTokenStore>,
        users: Arc<dyn CurrentUserGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            token_store,
            users,
            notifier,
            resolved: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the normalized role of the signed-in user.
    ///
    /// `Ok(None)` means the backend returned a role outside the closed set;
    /// callers resolve it to the all-false capability set.
    pub async fn role(&self) -> AppResult<Option<Role>> {
        Ok(self.resolve().await?.role)
    }

    /// Returns the signed-in user profile.
    pub async fn profile(&self) -> AppResult<UserProfile> {
        Ok(self.resolve().await?.profile)
    }

    /// Returns the capability set for the signed-in user.
    pub async fn capabilities(&self) -> AppResult<CapabilitySet> {
        Ok(CapabilitySet::resolve(self.role().await?))
    }

    /// Peeks at the cached role without triggering a fetch.
    ///
    /// `None` means the role has not resolved yet; controls gated on a
    /// capability stay hidden until it has.
    pub async fn resolved_role(&self) -> Option<Option<Role>> {
        self.resolved.read().await.as_ref().map(|session| session.role)
    }

    /// Clears the session after an authorization failure.
    ///
    /// Drops the stored token and the cached role, and surfaces a
    /// session-expired notice; the caller decides whether to re-route to the
    /// login boundary.
    pub async fn handle_auth_failure(&self) {
        self.token_store.clear();
        *self.resolved.write().await = None;
        self.notifier.notify(Notice::failure(
            "Session expired",
            "Please sign in again to continue.",
        ));
    }

    async fn resolve(&self) -> AppResult<ResolvedSession> {
        if let Some(session) = self.resolved.read().await.clone() {
            return Ok(session);
        }

        match self.users.current_user().await {
            Ok(profile) => {
                let role = Role::parse(profile.raw_role());
                info!(
                    user_name = profile.user_name(),
                    role = role.map(|role| role.as_str()).unwrap_or("unknown"),
                    "resolved console session"
                );

                let session = ResolvedSession { profile, role };
                *self.resolved.write().await = Some(session.clone());
                Ok(session)
            }
            Err(AppError::Unauthorized(detail)) => {
                self.handle_auth_failure().await;
                Err(AppError::Unauthorized(detail))
            }
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use evaldesk_core::{AppError, AppResult, SessionToken, UserProfile};
    use evaldesk_domain::Role;

    use crate::{CurrentUserGateway, Notice, Notifier, SessionTokenStore};

    use super::SessionService;

    struct FakeUsers {
        result: Result<UserProfile, String>,
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl CurrentUserGateway for FakeUsers {
        async fn current_user(&self) -> AppResult<UserProfile> {
            let mut calls = self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            *calls += 1;

            match &self.result {
                Ok(profile) => Ok(profile.clone()),
                Err(detail) => Err(AppError::Unauthorized(detail.clone())),
            }
        }
    }

    #[derive(Default)]
    struct FakeTokenStore {
        token: Mutex<Option<SessionToken>>,
    }

    impl SessionTokenStore for FakeTokenStore {
        fn load(&self) -> Option<SessionToken> {
            self.token
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
        }

        fn store(&self, token: SessionToken) {
            *self
                .token
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token);
        }

        fn clear(&self) {
            *self
                .token
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        }
    }

    #[derive(Default)]
    struct CollectingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl Notifier for CollectingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(notice);
        }
    }

    #[tokio::test]
    async fn role_is_normalized_and_cached() {
        let users = Arc::new(FakeUsers {
            result: Ok(UserProfile::new("alice", None, "Curator")),
            calls: Mutex::new(0),
        });
        let service = SessionService::new(
            Arc::new(FakeTokenStore::default()),
            users.clone(),
            Arc::new(CollectingNotifier::default()),
        );

        assert_eq!(service.resolved_role().await, None);

        let first = service.role().await;
        assert!(first.is_ok());
        assert_eq!(first.unwrap_or(None), Some(Role::Curator));

        let second = service.role().await;
        assert!(second.is_ok());
        assert_eq!(
            *users.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner()),
            1
        );
        assert_eq!(service.resolved_role().await, Some(Some(Role::Curator)));
    }

    #[tokio::test]
    async fn unknown_role_resolves_to_none() {
        let service = SessionService::new(
            Arc::new(FakeTokenStore::default()),
            Arc::new(FakeUsers {
                result: Ok(UserProfile::new("bob", None, "superuser")),
                calls: Mutex::new(0),
            }),
            Arc::new(CollectingNotifier::default()),
        );

        let role = service.role().await;
        assert!(role.is_ok());
        assert_eq!(role.unwrap_or(Some(Role::Admin)), None);
    }

    #[tokio::test]
    async fn unauthorized_fetch_clears_the_token() {
        let token_store = Arc::new(FakeTokenStore::default());
        token_store.store(SessionToken::new("stale-token"));
        let notifier = Arc::new(CollectingNotifier::default());
        let service = SessionService::new(
            token_store.clone(),
            Arc::new(FakeUsers {
                result: Err("token expired".to_owned()),
                calls: Mutex::new(0),
            }),
            notifier.clone(),
        );

        let result = service.role().await;
        assert!(result.is_err());
        assert!(token_store.load().is_none());
        assert_eq!(
            notifier
                .notices
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .len(),
            1
        );
    }
}
