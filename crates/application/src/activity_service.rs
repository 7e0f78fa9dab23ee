use std::sync::Arc;

use evaldesk_domain::{
    ActivityRecord, ActivityVisibilityPolicy, Capability, CapabilitySet, EntityKind,
};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{ActivityGateway, SessionService};

/// Presentation state of the per-entity audit history panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    /// Panel not opened.
    Closed,
    /// Open action issued; records are resolving.
    Loading,
    /// Visible records, newest first.
    Loaded(Vec<ActivityRecord>),
    /// Nothing visible: no records, none the viewer may see, or the fetch
    /// failed. Audit failures are non-fatal to the surrounding page.
    Empty,
}

/// Per-entity change-audit trail, filtered by the viewer's role.
///
/// Loaded only on an explicit open action, never eagerly. The viewer's role
/// is resolved through the shared session context, so repeated opens reuse
/// the cached role.
pub struct AuditTrailViewer {
    session: SessionService,
    gateway: Arc<dyn ActivityGateway>,
    policy: ActivityVisibilityPolicy,
    state: RwLock<HistoryView>,
}

impl AuditTrailViewer {
    /// Creates a closed viewer with the given visibility policy.
    #[must_use]
    pub fn new(
        session: SessionService,
        gateway: Arc<dyn ActivityGateway>,
        policy: ActivityVisibilityPolicy,
    ) -> Self {
        Self {
            session,
            gateway,
            policy,
            state: RwLock::new(HistoryView::Closed),
        }
    }

    /// Returns whether the history control should be rendered at all.
    ///
    /// Hidden (not disabled) until the viewer's role has resolved and it
    /// grants the view-history capability, so the control never flashes.
    pub async fn history_control_visible(&self) -> bool {
        match self.session.resolved_role().await {
            Some(role) => CapabilitySet::resolve(role).get(Capability::ViewHistory),
            None => false,
        }
    }

    /// Opens the history panel for one entity kind.
    ///
    /// Infallible by design: a failed role resolution or record fetch
    /// degrades to [`HistoryView::Empty`] without surfacing an error, and a
    /// new open action is the only retry.
    pub async fn open(&self, kind: EntityKind) {
        *self.state.write().await = HistoryView::Loading;

        let viewer = match self.session.role().await {
            Ok(Some(role)) => role,
            Ok(None) => {
                debug!(
                    kind = kind.as_str(),
                    "viewer role is outside the known set; hiding history"
                );
                *self.state.write().await = HistoryView::Empty;
                return;
            }
            Err(error) => {
                debug!(
                    kind = kind.as_str(),
                    error = %error,
                    "role resolution failed; hiding history"
                );
                *self.state.write().await = HistoryView::Empty;
                return;
            }
        };

        let records = match self.gateway.list_activity(kind).await {
            Ok(records) => records,
            Err(error) => {
                debug!(
                    kind = kind.as_str(),
                    error = %error,
                    "activity fetch failed; showing empty history"
                );
                *self.state.write().await = HistoryView::Empty;
                return;
            }
        };

        let visible: Vec<ActivityRecord> = records
            .into_iter()
            .filter(|record| self.policy.permits(viewer, record.actor_role()))
            .collect();

        *self.state.write().await = if visible.is_empty() {
            HistoryView::Empty
        } else {
            HistoryView::Loaded(visible)
        };
    }

    /// Closes the history panel.
    pub async fn close(&self) {
        *self.state.write().await = HistoryView::Closed;
    }

    /// Returns a snapshot of the panel state.
    pub async fn view(&self) -> HistoryView {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use evaldesk_core::{AppError, AppResult, SessionToken, UserProfile};
    use evaldesk_domain::{
        ActivityRecord, ActivityStatus, ActivitySubject, ActivityVisibilityPolicy, EntityKind,
        Role,
    };

    use crate::{
        ActivityGateway, CurrentUserGateway, Notice, Notifier, SessionService, SessionTokenStore,
    };

    use super::{AuditTrailViewer, HistoryView};

    struct FakeUsers {
        role: String,
    }

    #[async_trait]
    impl CurrentUserGateway for FakeUsers {
        async fn current_user(&self) -> AppResult<UserProfile> {
            Ok(UserProfile::new("carol", None, self.role.clone()))
        }
    }

    #[derive(Default)]
    struct NullTokenStore;

    impl SessionTokenStore for NullTokenStore {
        fn load(&self) -> Option<SessionToken> {
            None
        }

        fn store(&self, _token: SessionToken) {}

        fn clear(&self) {}
    }

    #[derive(Default)]
    struct NullNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl Notifier for NullNotifier {
        fn notify(&self, notice: Notice) {
            self.notices
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(notice);
        }
    }

    struct FakeActivity {
        records: AppResult<Vec<ActivityRecord>>,
    }

    #[async_trait]
    impl ActivityGateway for FakeActivity {
        async fn list_activity(&self, _kind: EntityKind) -> AppResult<Vec<ActivityRecord>> {
            match &self.records {
                Ok(records) => Ok(records.clone()),
                Err(_) => Err(AppError::Network("activity endpoint is down".to_owned())),
            }
        }
    }

    fn record(actor_role: Option<Role>, id: &str) -> ActivityRecord {
        let subject = ActivitySubject::from_parts(EntityKind::Target, id)
            .unwrap_or_else(|_| unreachable!());
        ActivityRecord::new(
            format!("updated target '{id}'"),
            ActivityStatus::Updated,
            "2026-02-11T09:30:00Z",
            "dana",
            actor_role,
            subject,
        )
        .unwrap_or_else(|_| unreachable!())
    }

    fn viewer(role: &str, records: AppResult<Vec<ActivityRecord>>) -> AuditTrailViewer {
        let session = SessionService::new(
            Arc::new(NullTokenStore),
            Arc::new(FakeUsers {
                role: role.to_owned(),
            }),
            Arc::new(NullNotifier::default()),
        );

        AuditTrailViewer::new(
            session,
            Arc::new(FakeActivity { records }),
            ActivityVisibilityPolicy::hierarchical(),
        )
    }

    #[tokio::test]
    async fn curator_sees_only_records_at_or_below_their_rank() {
        let viewer = viewer(
            "curator",
            Ok(vec![
                record(Some(Role::Admin), "t-1"),
                record(Some(Role::Curator), "t-2"),
                record(None, "t-3"),
            ]),
        );

        viewer.open(EntityKind::Target).await;

        match viewer.view().await {
            HistoryView::Loaded(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].subject().id(), "t-2");
            }
            other => panic!("expected loaded history, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_failure_degrades_to_empty() {
        let viewer = viewer(
            "admin",
            Err(AppError::Network("activity endpoint is down".to_owned())),
        );

        viewer.open(EntityKind::Target).await;
        assert_eq!(viewer.view().await, HistoryView::Empty);
    }

    #[tokio::test]
    async fn unknown_viewer_role_sees_nothing() {
        let viewer = viewer("contractor", Ok(vec![record(Some(Role::Viewer), "t-1")]));

        viewer.open(EntityKind::Target).await;
        assert_eq!(viewer.view().await, HistoryView::Empty);
    }

    #[tokio::test]
    async fn history_control_is_hidden_until_the_role_resolves() {
        let viewer = viewer("curator", Ok(Vec::new()));
        assert!(!viewer.history_control_visible().await);

        viewer.open(EntityKind::Target).await;
        assert!(viewer.history_control_visible().await);
    }

    #[tokio::test]
    async fn export_only_viewer_has_no_history_control() {
        let viewer = viewer("viewer", Ok(vec![record(Some(Role::Viewer), "t-1")]));

        viewer.open(EntityKind::Target).await;
        assert!(!viewer.history_control_visible().await);
    }

    #[tokio::test]
    async fn closing_resets_the_panel() {
        let viewer = viewer("admin", Ok(vec![record(Some(Role::Admin), "t-1")]));

        viewer.open(EntityKind::Target).await;
        assert!(matches!(viewer.view().await, HistoryView::Loaded(_)));

        viewer.close().await;
        assert_eq!(viewer.view().await, HistoryView::Closed);
    }
}
