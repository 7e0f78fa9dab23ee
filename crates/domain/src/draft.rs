use std::fmt::{Display, Formatter};

use crate::{CapabilitySet, ReferenceSource};

/// Field-shape contract for entities editable through the generic editor.
///
/// A draft exposes a canonical field-wise representation for change
/// detection, names its own required fields, and declares which reference
/// option sets its fields are constrained by.
pub trait EntityDraft: Clone + Default + PartialEq + Send + Sync + 'static {
    /// Returns one canonical element per editable field.
    ///
    /// Scalar fields contribute their text value; list-valued fields
    /// contribute [`canonical_list_value`] so membership changes are visible
    /// while pure reordering is not.
    fn fingerprint(&self) -> Vec<String>;

    /// Returns the names of required fields that are currently blank.
    fn missing_required_fields(&self) -> Vec<&'static str>;

    /// Returns the option sources this draft's fields are constrained by.
    fn reference_sources() -> &'static [ReferenceSource];
}

/// Canonical joined representation of a list-valued draft field.
///
/// Values are trimmed, blanks dropped, then sorted and joined. Reordering a
/// list without changing membership therefore compares equal, while
/// duplicates and membership changes do not; this is still a joined-text
/// comparison, not a set comparison.
#[must_use]
pub fn canonical_list_value(values: &[String]) -> String {
    let mut cleaned: Vec<&str> = values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();
    cleaned.sort_unstable();
    cleaned.join(",")
}

/// Whether an editor session creates a new entity or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// Seeded from defaults; submits through the create endpoint.
    Create,
    /// Seeded from a server-confirmed entity; submits through update.
    Update,
}

/// A single local precondition blocking submission.
///
/// Surfaced immediately in the UI and never sent to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Draft equals the baseline; nothing to save.
    DraftUnchanged,
    /// The justification notes field is blank.
    NotesRequired,
    /// A required entity field is blank.
    MissingField(&'static str),
    /// The caller's capability set does not grant the mutating action.
    CapabilityDenied,
    /// A reference option set the draft depends on has not loaded.
    OptionsPending,
}

impl Display for ValidationIssue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DraftUnchanged => formatter.write_str("no changes to save"),
            Self::NotesRequired => formatter.write_str("notes are required"),
            Self::MissingField(field) => write!(formatter, "required field '{field}' is blank"),
            Self::CapabilityDenied => formatter.write_str("role does not permit this change"),
            Self::OptionsPending => formatter.write_str("reference options are still loading"),
        }
    }
}

/// Reconciles a mutable draft against the last server-confirmed baseline.
///
/// Owned exclusively by one open editor; created when the editor opens and
/// dropped when it closes, so no draft state survives across sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSession<T: EntityDraft> {
    mode: EditorMode,
    baseline: Option<T>,
    draft: T,
    notes: String,
}

impl<T: EntityDraft> DraftSession<T> {
    /// Starts a create-flow session seeded from defaults.
    #[must_use]
    pub fn for_create() -> Self {
        Self {
            mode: EditorMode::Create,
            baseline: None,
            draft: T::default(),
            notes: String::new(),
        }
    }

    /// Starts an update-flow session seeded from a loaded entity.
    #[must_use]
    pub fn for_update(baseline: T) -> Self {
        Self {
            mode: EditorMode::Update,
            draft: baseline.clone(),
            baseline: Some(baseline),
            notes: String::new(),
        }
    }

    /// Returns the session mode.
    #[must_use]
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Returns the current draft.
    #[must_use]
    pub fn draft(&self) -> &T {
        &self.draft
    }

    /// Returns the draft for mutation.
    pub fn draft_mut(&mut self) -> &mut T {
        &mut self.draft
    }

    /// Returns the justification notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        self.notes.as_str()
    }

    /// Replaces the justification notes.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Returns whether the draft differs from its baseline.
    ///
    /// Field-wise comparison over the canonical fingerprint; in create flow
    /// the baseline is the default draft, so any edit counts as a change.
    /// Derived on demand, never stored.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        let baseline_fingerprint = match &self.baseline {
            Some(baseline) => baseline.fingerprint(),
            None => T::default().fingerprint(),
        };

        self.draft.fingerprint() != baseline_fingerprint
    }

    /// Lists every precondition currently blocking submission.
    ///
    /// `options_ready` must be false while any reference option set the
    /// draft depends on is still loading or came back empty.
    #[must_use]
    pub fn blocking_issues(
        &self,
        capabilities: &CapabilitySet,
        options_ready: bool,
    ) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if !self.is_changed() {
            issues.push(ValidationIssue::DraftUnchanged);
        }

        if self.notes.trim().is_empty() {
            issues.push(ValidationIssue::NotesRequired);
        }

        for field in self.draft.missing_required_fields() {
            issues.push(ValidationIssue::MissingField(field));
        }

        let permitted = match self.mode {
            EditorMode::Create => capabilities.permits_create(),
            EditorMode::Update => capabilities.permits_update(),
        };
        if !permitted {
            issues.push(ValidationIssue::CapabilityDenied);
        }

        if !options_ready {
            issues.push(ValidationIssue::OptionsPending);
        }

        issues
    }

    /// Returns whether a submit action is currently allowed.
    #[must_use]
    pub fn can_submit(&self, capabilities: &CapabilitySet, options_ready: bool) -> bool {
        self.blocking_issues(capabilities, options_ready).is_empty()
    }

    /// Installs the server-confirmed entity as the new baseline.
    ///
    /// Clears the notes and moves the session into update mode, since the
    /// entity now exists on the server.
    pub fn accept_submitted(&mut self, entity: T) {
        self.draft = entity.clone();
        self.baseline = Some(entity);
        self.notes.clear();
        self.mode = EditorMode::Update;
    }
}

#[cfg(test)]
mod tests {
    use super::{DraftSession, ValidationIssue, canonical_list_value};
    use crate::{CapabilitySet, Role, TargetDraft};

    fn curator_capabilities() -> CapabilitySet {
        CapabilitySet::resolve(Some(Role::Curator))
    }

    fn sample_target() -> TargetDraft {
        TargetDraft {
            name: "support-bot".to_owned(),
            description: "customer support assistant".to_owned(),
            target_type: "chat".to_owned(),
            languages: vec!["en".to_owned(), "de".to_owned()],
        }
    }

    #[test]
    fn reordering_a_list_is_not_a_change() {
        let left = canonical_list_value(&["en".to_owned(), "de".to_owned()]);
        let right = canonical_list_value(&["de".to_owned(), "en".to_owned()]);
        assert_eq!(left, right);
    }

    #[test]
    fn membership_and_duplicates_are_changes() {
        let base = canonical_list_value(&["en".to_owned(), "de".to_owned()]);
        let grown = canonical_list_value(&["en".to_owned(), "de".to_owned(), "fr".to_owned()]);
        let doubled = canonical_list_value(&["en".to_owned(), "en".to_owned(), "de".to_owned()]);
        assert_ne!(base, grown);
        assert_ne!(base, doubled);
    }

    #[test]
    fn update_session_starts_unchanged() {
        let session = DraftSession::for_update(sample_target());
        assert!(!session.is_changed());
        assert!(session.notes().is_empty());
    }

    #[test]
    fn create_session_changes_on_first_edit() {
        let mut session: DraftSession<TargetDraft> = DraftSession::for_create();
        assert!(!session.is_changed());

        session.draft_mut().name = "red-team-target".to_owned();
        assert!(session.is_changed());
    }

    #[test]
    fn language_reorder_alone_is_not_a_change() {
        let mut session = DraftSession::for_update(sample_target());
        session.draft_mut().languages = vec!["de".to_owned(), "en".to_owned()];
        assert!(!session.is_changed());

        session.draft_mut().languages.push("fr".to_owned());
        assert!(session.is_changed());
    }

    #[test]
    fn blank_notes_block_submission() {
        let mut session = DraftSession::for_update(sample_target());
        session.draft_mut().description = "adjusted".to_owned();

        assert!(!session.can_submit(&curator_capabilities(), true));

        session.set_notes("tightened the description");
        assert!(session.can_submit(&curator_capabilities(), true));
    }

    #[test]
    fn clearing_a_required_field_withdraws_submission() {
        let mut session = DraftSession::for_update(sample_target());
        session.draft_mut().description = "adjusted".to_owned();
        session.set_notes("tightened the description");
        assert!(session.can_submit(&curator_capabilities(), true));

        session.draft_mut().name.clear();
        assert!(!session.can_submit(&curator_capabilities(), true));
        assert!(
            session
                .blocking_issues(&curator_capabilities(), true)
                .contains(&ValidationIssue::MissingField("name"))
        );
    }

    #[test]
    fn pending_options_block_submission_regardless_of_fields() {
        let mut session = DraftSession::for_update(sample_target());
        session.draft_mut().description = "adjusted".to_owned();
        session.set_notes("tightened the description");

        assert!(!session.can_submit(&curator_capabilities(), false));
        assert!(
            session
                .blocking_issues(&curator_capabilities(), false)
                .contains(&ValidationIssue::OptionsPending)
        );
    }

    #[test]
    fn missing_capability_blocks_submission() {
        let viewer = CapabilitySet::resolve(Some(Role::Viewer));
        let mut session = DraftSession::for_update(sample_target());
        session.draft_mut().description = "adjusted".to_owned();
        session.set_notes("tightened the description");

        assert!(!session.can_submit(&viewer, true));
        assert!(
            session
                .blocking_issues(&viewer, true)
                .contains(&ValidationIssue::CapabilityDenied)
        );
    }

    #[test]
    fn accepting_a_submission_resets_notes_and_baseline() {
        let mut session = DraftSession::for_update(sample_target());
        session.draft_mut().description = "adjusted".to_owned();
        session.set_notes("tightened the description");

        let confirmed = session.draft().clone();
        session.accept_submitted(confirmed);

        assert!(!session.is_changed());
        assert!(session.notes().is_empty());
    }
}
