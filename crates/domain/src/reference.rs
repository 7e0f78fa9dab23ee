use std::str::FromStr;

use evaldesk_core::AppError;
use serde::{Deserialize, Serialize};

/// Backend option lists a draft field may be constrained by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    /// Allowed subject-matter domains.
    Domains,
    /// Allowed languages.
    Languages,
    /// Allowed target types.
    TargetTypes,
    /// Allowed evaluation metrics.
    Metrics,
}

impl ReferenceSource {
    /// Returns a stable storage value for this source.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domains => "domains",
            Self::Languages => "languages",
            Self::TargetTypes => "target_types",
            Self::Metrics => "metrics",
        }
    }

    /// Returns the URL path segment for this source's option endpoint.
    #[must_use]
    pub fn route_segment(&self) -> &'static str {
        match self {
            Self::Domains => "domains",
            Self::Languages => "languages",
            Self::TargetTypes => "target-types",
            Self::Metrics => "metrics",
        }
    }
}

impl FromStr for ReferenceSource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "domains" => Ok(Self::Domains),
            "languages" => Ok(Self::Languages),
            "target_types" => Ok(Self::TargetTypes),
            "metrics" => Ok(Self::Metrics),
            _ => Err(AppError::Validation(format!(
                "unknown reference source '{value}'"
            ))),
        }
    }
}

/// Named, ordered list of permissible values for one draft field.
///
/// Scoped to a single dialog session; re-fetched on every open because the
/// backend may have changed the list since the dialog was last used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOptionSet {
    source: ReferenceSource,
    values: Vec<String>,
}

impl ReferenceOptionSet {
    /// Creates an option set for one source.
    #[must_use]
    pub fn new(source: ReferenceSource, values: Vec<String>) -> Self {
        Self { source, values }
    }

    /// Returns the source this set belongs to.
    #[must_use]
    pub fn source(&self) -> ReferenceSource {
        self.source
    }

    /// Returns the permissible values in server order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns whether the set carries no permissible values.
    ///
    /// An empty set means the field has no valid domain yet, which keeps
    /// submission disabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::ReferenceSource;

    #[test]
    fn source_round_trips_storage_value() {
        for source in [
            ReferenceSource::Domains,
            ReferenceSource::Languages,
            ReferenceSource::TargetTypes,
            ReferenceSource::Metrics,
        ] {
            let restored = ReferenceSource::from_str(source.as_str());
            assert!(restored.is_ok());
            assert_eq!(restored.unwrap_or(ReferenceSource::Domains), source);
        }
    }
}
