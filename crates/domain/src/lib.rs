//! Domain entities and invariants for the evaluation console.

#![forbid(unsafe_code)]

mod activity;
mod capability;
mod draft;
mod drafts;
mod policy;
mod reference;
mod role;

pub use activity::{ActivityRecord, ActivityStatus, ActivitySubject, EntityKind};
pub use capability::{Capability, CapabilitySet, has_capability};
pub use draft::{DraftSession, EditorMode, EntityDraft, ValidationIssue, canonical_list_value};
pub use drafts::{
    DomainDraft, LanguageDraft, PromptDraft, ResponseDraft, StrategyDraft, TargetDraft,
    TestPlanDraft,
};
pub use policy::ActivityVisibilityPolicy;
pub use reference::{ReferenceOptionSet, ReferenceSource};
pub use role::Role;
