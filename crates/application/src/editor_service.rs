use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use evaldesk_core::{AppError, AppResult};
use evaldesk_domain::{
    CapabilitySet, DraftSession, EntityDraft, EntityKind, ReferenceOptionSet, ReferenceSource,
    ValidationIssue,
};
use tokio::sync::RwLock;
use tracing::warn;

use crate::{
    EditorObserver, EntityWriteGateway, Notice, Notifier, ReferenceDataCache, ReferenceDataGateway,
    SessionService, StoredEntity,
};

/// Lifecycle position of an entity editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStatus {
    /// No dialog session active.
    Closed,
    /// Dialog opened; reference options and role are resolving.
    OptionsLoading,
    /// Draft is editable.
    Ready,
    /// A submit is in flight; further submits are refused.
    Submitting,
}

enum EditorState<T: EntityDraft> {
    Closed,
    OptionsLoading,
    Ready(OpenEditor<T>),
    Submitting,
}

struct OpenEditor<T: EntityDraft> {
    entity_id: Option<String>,
    draft: DraftSession<T>,
    options: BTreeMap<ReferenceSource, ReferenceOptionSet>,
}

impl<T: EntityDraft> OpenEditor<T> {
    fn options_ready(&self) -> bool {
        T::reference_sources().iter().all(|source| {
            self.options
                .get(source)
                .map(|options| !options.is_empty())
                .unwrap_or(false)
        })
    }
}

/// Generic add/update dialog lifecycle shared by every entity kind.
///
/// Composes the reference data cache, the draft reconciliation session and
/// the capability resolver into the open/validate/submit/close protocol.
/// Exactly one dialog session is active per editor; reopening discards the
/// previous session entirely (last open wins, never merged).
pub struct EntityEditor<T: EntityDraft> {
    kind: EntityKind,
    session: SessionService,
    writer: Arc<dyn EntityWriteGateway<T>>,
    references: Arc<dyn ReferenceDataGateway>,
    notifier: Arc<dyn Notifier>,
    observer: Arc<dyn EditorObserver>,
    state: RwLock<EditorState<T>>,
    epoch: AtomicU64,
}

impl<T: EntityDraft> EntityEditor<T> {
    /// Creates a closed editor for one entity kind.
    #[must_use]
    pub fn new(
        kind: EntityKind,
        session: SessionService,
        writer: Arc<dyn EntityWriteGateway<T>>,
        references: Arc<dyn ReferenceDataGateway>,
        notifier: Arc<dyn Notifier>,
        observer: Arc<dyn EditorObserver>,
    ) -> Self {
        Self {
            kind,
            session,
            writer,
            references,
            notifier,
            observer,
            state: RwLock::new(EditorState::Closed),
            epoch: AtomicU64::new(0),
        }
    }

    /// Returns the entity kind this editor mutates.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Opens the dialog session.
    ///
    /// `baseline` seeds an update flow; `None` seeds a create flow from
    /// defaults. The role and every reference source the draft declares are
    /// resolved concurrently and independently; a failed role fetch still
    /// opens the dialog (submission then fails closed). If the editor is
    /// closed or reopened while the fetches are in flight, their resolution
    /// is discarded.
    pub async fn open(&self, baseline: Option<StoredEntity<T>>) -> AppResult<()> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.write().await = EditorState::OptionsLoading;

        let cache = ReferenceDataCache::new(self.references.clone());
        let (role_result, ()) = tokio::join!(
            self.session.role(),
            cache.load_all(T::reference_sources())
        );
        if let Err(error) = role_result {
            warn!(
                kind = self.kind.as_str(),
                error = %error,
                "role resolution failed while opening editor"
            );
        }

        let mut state = self.state.write().await;
        if self.epoch.load(Ordering::SeqCst) != epoch
            || !matches!(*state, EditorState::OptionsLoading)
        {
            return Ok(());
        }

        let draft = match &baseline {
            Some(stored) => DraftSession::for_update(stored.entity.clone()),
            None => DraftSession::for_create(),
        };

        *state = EditorState::Ready(OpenEditor {
            entity_id: baseline.map(|stored| stored.entity_id),
            draft,
            options: cache.snapshot().await,
        });

        Ok(())
    }

    /// Closes the dialog session and discards draft, notes and options.
    ///
    /// Safe to call in any state; pending open or submit resolutions become
    /// no-ops against the discarded session.
    pub async fn close(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.state.write().await = EditorState::Closed;
    }

    /// Returns the editor's lifecycle position.
    pub async fn status(&self) -> EditorStatus {
        match &*self.state.read().await {
            EditorState::Closed => EditorStatus::Closed,
            EditorState::OptionsLoading => EditorStatus::OptionsLoading,
            EditorState::Ready(_) => EditorStatus::Ready,
            EditorState::Submitting => EditorStatus::Submitting,
        }
    }

    /// Mutates the draft in place.
    pub async fn edit_draft(&self, apply: impl FnOnce(&mut T)) -> AppResult<()> {
        match &mut *self.state.write().await {
            EditorState::Ready(open) => {
                apply(open.draft.draft_mut());
                Ok(())
            }
            _ => Err(AppError::Conflict(
                "editor is not open for editing".to_owned(),
            )),
        }
    }

    /// Replaces the justification notes.
    pub async fn set_notes(&self, notes: impl Into<String>) -> AppResult<()> {
        match &mut *self.state.write().await {
            EditorState::Ready(open) => {
                open.draft.set_notes(notes);
                Ok(())
            }
            _ => Err(AppError::Conflict(
                "editor is not open for editing".to_owned(),
            )),
        }
    }

    /// Returns a snapshot of the current draft, when the editor is open.
    pub async fn draft(&self) -> Option<T> {
        match &*self.state.read().await {
            EditorState::Ready(open) => Some(open.draft.draft().clone()),
            _ => None,
        }
    }

    /// Returns the current justification notes, when the editor is open.
    pub async fn notes(&self) -> Option<String> {
        match &*self.state.read().await {
            EditorState::Ready(open) => Some(open.draft.notes().to_owned()),
            _ => None,
        }
    }

    /// Returns the loaded option values for one source.
    pub async fn options(&self, source: ReferenceSource) -> Option<Vec<String>> {
        match &*self.state.read().await {
            EditorState::Ready(open) => open
                .options
                .get(&source)
                .map(|options| options.values().to_vec()),
            _ => None,
        }
    }

    /// Lists every precondition currently blocking submission.
    pub async fn blocking_issues(&self) -> Vec<ValidationIssue> {
        let capabilities = self.resolved_capabilities().await;

        match &*self.state.read().await {
            EditorState::Ready(open) => {
                open.draft.blocking_issues(&capabilities, open.options_ready())
            }
            _ => Vec::new(),
        }
    }

    /// Returns whether a submit action is currently allowed.
    pub async fn can_submit(&self) -> bool {
        let capabilities = self.resolved_capabilities().await;

        match &*self.state.read().await {
            EditorState::Ready(open) => {
                open.draft.can_submit(&capabilities, open.options_ready())
            }
            _ => false,
        }
    }

    /// Submits the draft through the create or update endpoint.
    ///
    /// Validation failures never reach the network. At most one submit per
    /// editor is in flight; a concurrent attempt is refused. On success the
    /// dialog closes and the owning page is signalled to re-fetch its list;
    /// on failure the dialog stays open with the draft intact.
    pub async fn submit(&self) -> AppResult<()> {
        let epoch = self.epoch.load(Ordering::SeqCst);

        // Consult the capability resolver once more before the write, in
        // case the session changed since the dialog was rendered.
        let capabilities = match self.session.role().await {
            Ok(role) => CapabilitySet::resolve(role),
            Err(_) => CapabilitySet::none(),
        };

        let open = {
            let mut state = self.state.write().await;
            let previous = std::mem::replace(&mut *state, EditorState::Submitting);
            let open = match previous {
                EditorState::Ready(open) => open,
                other => {
                    let refusal = match &other {
                        EditorState::Submitting => AppError::Conflict(
                            "a submit for this editor is already in flight".to_owned(),
                        ),
                        _ => AppError::Validation("editor is not open".to_owned()),
                    };
                    *state = other;
                    return Err(refusal);
                }
            };

            let issues = open.draft.blocking_issues(&capabilities, open.options_ready());
            if !issues.is_empty() {
                let detail = issues
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                *state = EditorState::Ready(open);
                return Err(AppError::Validation(detail));
            }

            open
        };

        let result = match open.entity_id.as_deref() {
            Some(entity_id) => {
                self.writer
                    .update_entity(entity_id, open.draft.draft(), open.draft.notes())
                    .await
            }
            None => {
                self.writer
                    .create_entity(open.draft.draft(), open.draft.notes())
                    .await
            }
        };

        match result {
            Ok(stored) => {
                self.notifier.notify(Notice::success(
                    "Saved",
                    format!("{} '{}' was saved", self.kind.as_str(), stored.entity_id),
                ));
                self.observer.entity_saved(self.kind, stored.entity_id.as_str());

                let mut state = self.state.write().await;
                if self.epoch.load(Ordering::SeqCst) == epoch
                    && matches!(*state, EditorState::Submitting)
                {
                    *state = EditorState::Closed;
                }
                Ok(())
            }
            Err(error) => {
                if matches!(error, AppError::Unauthorized(_)) {
                    self.session.handle_auth_failure().await;
                } else {
                    self.notifier
                        .notify(Notice::failure("Save failed", error.to_string()));
                }

                let mut state = self.state.write().await;
                if self.epoch.load(Ordering::SeqCst) == epoch
                    && matches!(*state, EditorState::Submitting)
                {
                    *state = EditorState::Ready(open);
                }
                Err(error)
            }
        }
    }

    /// Deletes an entity from the owning page's action row.
    ///
    /// Gated on the delete capability and on non-blank justification notes;
    /// both checks are local and never reach the network.
    pub async fn remove(&self, entity_id: &str, notes: &str) -> AppResult<()> {
        let capabilities = match self.session.role().await {
            Ok(role) => CapabilitySet::resolve(role),
            Err(_) => CapabilitySet::none(),
        };

        if !capabilities.permits_delete() {
            return Err(AppError::Forbidden(format!(
                "role does not permit deleting a {}",
                self.kind.as_str()
            )));
        }

        if notes.trim().is_empty() {
            return Err(AppError::Validation(
                "notes are required to delete an entity".to_owned(),
            ));
        }

        match self.writer.delete_entity(entity_id, notes).await {
            Ok(()) => {
                self.notifier.notify(Notice::success(
                    "Deleted",
                    format!("{} '{}' was deleted", self.kind.as_str(), entity_id),
                ));
                self.observer.entity_deleted(self.kind, entity_id);
                Ok(())
            }
            Err(error) => {
                if matches!(error, AppError::Unauthorized(_)) {
                    self.session.handle_auth_failure().await;
                } else {
                    self.notifier
                        .notify(Notice::failure("Delete failed", error.to_string()));
                }
                Err(error)
            }
        }
    }

    async fn resolved_capabilities(&self) -> CapabilitySet {
        match self.session.resolved_role().await {
            Some(role) => CapabilitySet::resolve(role),
            None => CapabilitySet::none(),
        }
    }
}
