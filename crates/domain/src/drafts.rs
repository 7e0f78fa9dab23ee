//! Editable field shapes for the curated entity kinds.
//!
//! These are deliberately thin: the backend owns the authoritative schemas,
//! the console only needs the editable surface each dialog exposes.

use serde::{Deserialize, Serialize};

use crate::{EntityDraft, ReferenceSource, canonical_list_value};

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Editable fields of an evaluation target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDraft {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Target type, constrained by the target-type option set.
    pub target_type: String,
    /// Languages the target supports, constrained by the language option set.
    pub languages: Vec<String>,
}

impl EntityDraft for TargetDraft {
    fn fingerprint(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.description.clone(),
            self.target_type.clone(),
            canonical_list_value(&self.languages),
        ]
    }

    fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if blank(&self.name) {
            missing.push("name");
        }
        if blank(&self.target_type) {
            missing.push("target_type");
        }
        missing
    }

    fn reference_sources() -> &'static [ReferenceSource] {
        &[ReferenceSource::TargetTypes, ReferenceSource::Languages]
    }
}

/// Editable fields of a prompt.
///
/// Shared by the prompt and llm-prompt endpoint families, which differ only
/// in where the backend stores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDraft {
    /// Short title.
    pub title: String,
    /// Prompt body text.
    pub body: String,
    /// Subject-matter domain, constrained by the domain option set.
    pub domain: String,
    /// Metrics scored against this prompt, constrained by the metric option set.
    pub metrics: Vec<String>,
}

impl EntityDraft for PromptDraft {
    fn fingerprint(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.body.clone(),
            self.domain.clone(),
            canonical_list_value(&self.metrics),
        ]
    }

    fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if blank(&self.title) {
            missing.push("title");
        }
        if blank(&self.body) {
            missing.push("body");
        }
        if blank(&self.domain) {
            missing.push("domain");
        }
        missing
    }

    fn reference_sources() -> &'static [ReferenceSource] {
        &[ReferenceSource::Domains, ReferenceSource::Metrics]
    }
}

/// Editable fields of a recorded response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDraft {
    /// Identifier of the prompt this response answers.
    pub prompt_ref: String,
    /// Response body text.
    pub body: String,
    /// Response language, constrained by the language option set.
    pub language: String,
}

impl EntityDraft for ResponseDraft {
    fn fingerprint(&self) -> Vec<String> {
        vec![
            self.prompt_ref.clone(),
            self.body.clone(),
            self.language.clone(),
        ]
    }

    fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if blank(&self.prompt_ref) {
            missing.push("prompt_ref");
        }
        if blank(&self.body) {
            missing.push("body");
        }
        missing
    }

    fn reference_sources() -> &'static [ReferenceSource] {
        &[ReferenceSource::Languages]
    }
}

/// Editable fields of an evaluation strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDraft {
    /// Display name.
    pub name: String,
    /// Free-text summary of the approach.
    pub summary: String,
    /// Metrics the strategy optimizes for, constrained by the metric option set.
    pub metrics: Vec<String>,
}

impl EntityDraft for StrategyDraft {
    fn fingerprint(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.summary.clone(),
            canonical_list_value(&self.metrics),
        ]
    }

    fn missing_required_fields(&self) -> Vec<&'static str> {
        if blank(&self.name) {
            vec!["name"]
        } else {
            Vec::new()
        }
    }

    fn reference_sources() -> &'static [ReferenceSource] {
        &[ReferenceSource::Metrics]
    }
}

/// Editable fields of a test plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPlanDraft {
    /// Display name.
    pub name: String,
    /// What the plan is meant to demonstrate.
    pub objective: String,
    /// Metrics the plan reports on, constrained by the metric option set.
    pub metrics: Vec<String>,
}

impl EntityDraft for TestPlanDraft {
    fn fingerprint(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.objective.clone(),
            canonical_list_value(&self.metrics),
        ]
    }

    fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if blank(&self.name) {
            missing.push("name");
        }
        if blank(&self.objective) {
            missing.push("objective");
        }
        missing
    }

    fn reference_sources() -> &'static [ReferenceSource] {
        &[ReferenceSource::Metrics]
    }
}

/// Editable fields of a subject-matter domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDraft {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
}

impl EntityDraft for DomainDraft {
    fn fingerprint(&self) -> Vec<String> {
        vec![self.name.clone(), self.description.clone()]
    }

    fn missing_required_fields(&self) -> Vec<&'static str> {
        if blank(&self.name) {
            vec!["name"]
        } else {
            Vec::new()
        }
    }

    fn reference_sources() -> &'static [ReferenceSource] {
        &[]
    }
}

/// Editable fields of a supported language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDraft {
    /// Display name.
    pub name: String,
    /// BCP 47 language code.
    pub code: String,
}

impl EntityDraft for LanguageDraft {
    fn fingerprint(&self) -> Vec<String> {
        vec![self.name.clone(), self.code.clone()]
    }

    fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if blank(&self.name) {
            missing.push("name");
        }
        if blank(&self.code) {
            missing.push("code");
        }
        missing
    }

    fn reference_sources() -> &'static [ReferenceSource] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::{PromptDraft, TargetDraft};
    use crate::{EntityDraft, ReferenceSource};

    #[test]
    fn target_requires_name_and_type() {
        let draft = TargetDraft::default();
        assert_eq!(draft.missing_required_fields(), vec!["name", "target_type"]);
    }

    #[test]
    fn prompt_requires_title_body_and_domain() {
        let draft = PromptDraft {
            title: "jailbreak probe".to_owned(),
            ..PromptDraft::default()
        };
        assert_eq!(draft.missing_required_fields(), vec!["body", "domain"]);
    }

    #[test]
    fn target_declares_its_option_sources() {
        assert_eq!(
            TargetDraft::reference_sources(),
            &[ReferenceSource::TargetTypes, ReferenceSource::Languages]
        );
    }
}
