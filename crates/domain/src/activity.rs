use std::str::FromStr;

use evaldesk_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::Role;

/// Kinds of curated entities tracked by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Evaluation target system.
    Target,
    /// Evaluation prompt.
    Prompt,
    /// Model-generated prompt variant.
    LlmPrompt,
    /// Recorded model response.
    Response,
    /// Evaluation strategy.
    Strategy,
    /// Test plan grouping strategies and prompts.
    TestPlan,
    /// Subject-matter domain.
    Domain,
    /// Supported language.
    Language,
}

impl EntityKind {
    /// Returns a stable storage value for this entity kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Prompt => "prompt",
            Self::LlmPrompt => "llm_prompt",
            Self::Response => "response",
            Self::Strategy => "strategy",
            Self::TestPlan => "test_plan",
            Self::Domain => "domain",
            Self::Language => "language",
        }
    }

    /// Returns the URL path segment for this kind's endpoint family.
    #[must_use]
    pub fn route_segment(&self) -> &'static str {
        match self {
            Self::Target => "targets",
            Self::Prompt => "prompts",
            Self::LlmPrompt => "llm-prompts",
            Self::Response => "responses",
            Self::Strategy => "strategies",
            Self::TestPlan => "test-plans",
            Self::Domain => "domains",
            Self::Language => "languages",
        }
    }

    /// Returns the wire field that carries this kind's identifier on an
    /// activity record.
    ///
    /// This is the single mapping table replacing per-record field probing:
    /// every activity payload carries exactly one of these fields.
    #[must_use]
    pub fn activity_id_field(&self) -> &'static str {
        match self {
            Self::Target => "target_id",
            Self::Prompt => "prompt_id",
            Self::LlmPrompt => "llm_prompt_id",
            Self::Response => "response_id",
            Self::Strategy => "strategy_id",
            Self::TestPlan => "test_plan_id",
            Self::Domain => "domain_id",
            Self::Language => "language_id",
        }
    }

    /// Returns all known entity kinds.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[EntityKind] = &[
            EntityKind::Target,
            EntityKind::Prompt,
            EntityKind::LlmPrompt,
            EntityKind::Response,
            EntityKind::Strategy,
            EntityKind::TestPlan,
            EntityKind::Domain,
            EntityKind::Language,
        ];

        ALL
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "target" => Ok(Self::Target),
            "prompt" => Ok(Self::Prompt),
            "llm_prompt" => Ok(Self::LlmPrompt),
            "response" => Ok(Self::Response),
            "strategy" => Ok(Self::Strategy),
            "test_plan" => Ok(Self::TestPlan),
            "domain" => Ok(Self::Domain),
            "language" => Ok(Self::Language),
            _ => Err(AppError::Validation(format!(
                "unknown entity kind '{value}'"
            ))),
        }
    }
}

/// Mutation outcome recorded on an activity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// Entity was created.
    Created,
    /// Entity was updated.
    Updated,
    /// Entity was deleted.
    Deleted,
}

impl ActivityStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl FromStr for ActivityStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "deleted" => Ok(Self::Deleted),
            _ => Err(AppError::Validation(format!(
                "unknown activity status '{value}'"
            ))),
        }
    }
}

/// Tagged identifier linking an activity record to the entity it touched.
///
/// One variant per entity kind, each carrying the kind's own identifier
/// field, so records never need duck-typed field probing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity_type", rename_all = "snake_case")]
pub enum ActivitySubject {
    /// Activity against an evaluation target.
    Target {
        /// Target identifier.
        target_id: String,
    },
    /// Activity against a prompt.
    Prompt {
        /// Prompt identifier.
        prompt_id: String,
    },
    /// Activity against a model-generated prompt.
    LlmPrompt {
        /// Model prompt identifier.
        llm_prompt_id: String,
    },
    /// Activity against a recorded response.
    Response {
        /// Response identifier.
        response_id: String,
    },
    /// Activity against a strategy.
    Strategy {
        /// Strategy identifier.
        strategy_id: String,
    },
    /// Activity against a test plan.
    TestPlan {
        /// Test plan identifier.
        test_plan_id: String,
    },
    /// Activity against a domain.
    Domain {
        /// Domain identifier.
        domain_id: String,
    },
    /// Activity against a language.
    Language {
        /// Language identifier.
        language_id: String,
    },
}

impl ActivitySubject {
    /// Builds a subject from an entity kind and its identifier.
    pub fn from_parts(kind: EntityKind, id: impl Into<String>) -> AppResult<Self> {
        let id = String::from(NonEmptyString::new(id)?);

        Ok(match kind {
            EntityKind::Target => Self::Target { target_id: id },
            EntityKind::Prompt => Self::Prompt { prompt_id: id },
            EntityKind::LlmPrompt => Self::LlmPrompt { llm_prompt_id: id },
            EntityKind::Response => Self::Response { response_id: id },
            EntityKind::Strategy => Self::Strategy { strategy_id: id },
            EntityKind::TestPlan => Self::TestPlan { test_plan_id: id },
            EntityKind::Domain => Self::Domain { domain_id: id },
            EntityKind::Language => Self::Language { language_id: id },
        })
    }

    /// Returns the entity kind this subject refers to.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Target { .. } => EntityKind::Target,
            Self::Prompt { .. } => EntityKind::Prompt,
            Self::LlmPrompt { .. } => EntityKind::LlmPrompt,
            Self::Response { .. } => EntityKind::Response,
            Self::Strategy { .. } => EntityKind::Strategy,
            Self::TestPlan { .. } => EntityKind::TestPlan,
            Self::Domain { .. } => EntityKind::Domain,
            Self::Language { .. } => EntityKind::Language,
        }
    }

    /// Returns the entity identifier carried by this subject.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Target { target_id } => target_id,
            Self::Prompt { prompt_id } => prompt_id,
            Self::LlmPrompt { llm_prompt_id } => llm_prompt_id,
            Self::Response { response_id } => response_id,
            Self::Strategy { strategy_id } => strategy_id,
            Self::TestPlan { test_plan_id } => test_plan_id,
            Self::Domain { domain_id } => domain_id,
            Self::Language { language_id } => language_id,
        }
    }
}

/// One historical mutation of a curated entity.
///
/// Produced server-side, immutable, read-only on the client. The actor role
/// is normalized at construction; values outside the closed role set become
/// `None` and are only visible where the visibility policy explicitly allows
/// unattributed records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    description: NonEmptyString,
    status: ActivityStatus,
    occurred_at: String,
    actor_name: String,
    actor_role: Option<Role>,
    subject: ActivitySubject,
}

impl ActivityRecord {
    /// Creates a validated activity record projection.
    pub fn new(
        description: impl Into<String>,
        status: ActivityStatus,
        occurred_at: impl Into<String>,
        actor_name: impl Into<String>,
        actor_role: Option<Role>,
        subject: ActivitySubject,
    ) -> AppResult<Self> {
        let occurred_at = occurred_at.into();
        if occurred_at.trim().is_empty() {
            return Err(AppError::Validation(
                "activity record requires a timestamp".to_owned(),
            ));
        }

        Ok(Self {
            description: NonEmptyString::new(description)?,
            status,
            occurred_at,
            actor_name: actor_name.into(),
            actor_role,
            subject,
        })
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the mutation status.
    #[must_use]
    pub fn status(&self) -> ActivityStatus {
        self.status
    }

    /// Returns the RFC3339 timestamp text; lexical order is time order.
    #[must_use]
    pub fn occurred_at(&self) -> &str {
        self.occurred_at.as_str()
    }

    /// Returns the display name of the acting user.
    #[must_use]
    pub fn actor_name(&self) -> &str {
        self.actor_name.as_str()
    }

    /// Returns the normalized role of the acting user, when known.
    #[must_use]
    pub fn actor_role(&self) -> Option<Role> {
        self.actor_role
    }

    /// Returns the entity this record refers to.
    #[must_use]
    pub fn subject(&self) -> &ActivitySubject {
        &self.subject
    }
}
