use serde::{Deserialize, Serialize};

/// Closed set of console roles.
///
/// Backend role values are free-form text; they are normalized into this set
/// exactly once at the session boundary. Anything that does not parse is
/// treated as an unknown role and resolves to the all-false capability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access, including user management.
    Admin,
    /// Manages table-level structures.
    Manager,
    /// Creates and updates evaluation records.
    Curator,
    /// Read-only access with data export.
    Viewer,
}

impl Role {
    /// Normalizes a raw role value, case-insensitively.
    ///
    /// `"viewer"` and `"user"` are alternative spellings of the same role.
    /// Unknown or empty input yields `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "curator" => Some(Self::Curator),
            "viewer" | "user" => Some(Self::Viewer),
            _ => None,
        }
    }

    /// Returns the canonical lowercase value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Curator => "curator",
            Self::Viewer => "viewer",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Admin, Role::Manager, Role::Curator, Role::Viewer];

        ALL
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("  Manager "), Some(Role::Manager));
    }

    #[test]
    fn user_is_an_alias_for_viewer() {
        assert_eq!(Role::parse("user"), Some(Role::Viewer));
        assert_eq!(Role::parse("viewer"), Some(Role::Viewer));
    }

    #[test]
    fn unknown_and_empty_values_do_not_parse() {
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }
}
