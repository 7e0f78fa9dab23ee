use async_trait::async_trait;
use evaldesk_core::{AppResult, SessionToken, UserProfile};
use evaldesk_domain::{ActivityRecord, EntityKind, ReferenceOptionSet, ReferenceSource};
use serde::{Deserialize, Serialize};

/// A server-confirmed entity paired with its stable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity<T> {
    /// Backend identifier for the entity.
    pub entity_id: String,
    /// The entity's editable fields.
    #[serde(flatten)]
    pub entity: T,
}

/// Port for resolving the signed-in user.
#[async_trait]
pub trait CurrentUserGateway: Send + Sync {
    /// Fetches the current-user projection from the backend.
    async fn current_user(&self) -> AppResult<UserProfile>;
}

/// Port for reading per-entity activity history.
#[async_trait]
pub trait ActivityGateway: Send + Sync {
    /// Lists activity records for one entity kind, newest first.
    async fn list_activity(&self, kind: EntityKind) -> AppResult<Vec<ActivityRecord>>;
}

/// Port for reading reference option lists.
#[async_trait]
pub trait ReferenceDataGateway: Send + Sync {
    /// Fetches the permissible values for one option source.
    async fn fetch_options(&self, source: ReferenceSource) -> AppResult<ReferenceOptionSet>;
}

/// Port for one entity kind's CRUD endpoint family.
#[async_trait]
pub trait EntityWriteGateway<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Lists the authoritative entities of this kind.
    async fn list_entities(&self) -> AppResult<Vec<StoredEntity<T>>>;

    /// Creates an entity from a draft with its justification notes.
    async fn create_entity(&self, draft: &T, notes: &str) -> AppResult<StoredEntity<T>>;

    /// Updates an entity from a draft with its justification notes.
    async fn update_entity(
        &self,
        entity_id: &str,
        draft: &T,
        notes: &str,
    ) -> AppResult<StoredEntity<T>>;

    /// Deletes an entity, recording the justification notes.
    async fn delete_entity(&self, entity_id: &str, notes: &str) -> AppResult<()>;
}

/// Port over ambient session storage for the bearer token.
///
/// Synchronous on purpose: the store is local state, not an I/O collaborator.
pub trait SessionTokenStore: Send + Sync {
    /// Returns the stored token, if any.
    fn load(&self) -> Option<SessionToken>;

    /// Replaces the stored token.
    fn store(&self, token: SessionToken);

    /// Clears the stored token, signing the session out.
    fn clear(&self);
}

/// Severity of a transient user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    /// The action completed.
    Success,
    /// The action failed; the surrounding page stays usable.
    Failure,
}

/// Non-blocking transient notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Short title.
    pub title: String,
    /// Supporting detail, often the server-provided message.
    pub detail: String,
    /// Outcome severity.
    pub severity: NoticeSeverity,
}

impl Notice {
    /// Creates a success notice.
    #[must_use]
    pub fn success(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
            severity: NoticeSeverity::Success,
        }
    }

    /// Creates a failure notice.
    #[must_use]
    pub fn failure(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
            severity: NoticeSeverity::Failure,
        }
    }
}

/// Port for surfacing transient notifications.
pub trait Notifier: Send + Sync {
    /// Emits one notification; must never block.
    fn notify(&self, notice: Notice);
}

/// Callbacks from an editor to its owning page.
///
/// `entity_saved` is the page's cue to re-fetch its authoritative list (a
/// pull, never a patch of local state) and to treat any cached audit trail
/// for the kind as stale.
pub trait EditorObserver: Send + Sync {
    /// An entity was created or updated.
    fn entity_saved(&self, kind: EntityKind, entity_id: &str);

    /// An entity was deleted.
    fn entity_deleted(&self, kind: EntityKind, entity_id: &str);
}
