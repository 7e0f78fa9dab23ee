use serde::{Deserialize, Serialize};

use crate::Role;

/// A single named permission bit derived from a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Allows managing console user accounts.
    ManageUsers,
    /// Allows creating table-level structures.
    CreateTable,
    /// Allows updating table-level structures.
    UpdateTable,
    /// Allows deleting table-level structures.
    DeleteTable,
    /// Allows creating evaluation records.
    CreateRecord,
    /// Allows updating evaluation records.
    UpdateRecord,
    /// Allows exporting evaluation data.
    ExportData,
    /// Allows opening per-entity audit history.
    ViewHistory,
}

impl Capability {
    /// Returns a stable storage value for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageUsers => "manage_users",
            Self::CreateTable => "create_table",
            Self::UpdateTable => "update_table",
            Self::DeleteTable => "delete_table",
            Self::CreateRecord => "create_record",
            Self::UpdateRecord => "update_record",
            Self::ExportData => "export_data",
            Self::ViewHistory => "view_history",
        }
    }

    /// Returns all known capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::ManageUsers,
            Capability::CreateTable,
            Capability::UpdateTable,
            Capability::DeleteTable,
            Capability::CreateRecord,
            Capability::UpdateRecord,
            Capability::ExportData,
            Capability::ViewHistory,
        ];

        ALL
    }
}

/// Fixed-shape record of the permission bits granted to one role.
///
/// Produced deterministically by [`CapabilitySet::resolve`]; immutable once
/// produced. Every UI gate in the console goes through this single table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    manage_users: bool,
    create_table: bool,
    update_table: bool,
    delete_table: bool,
    create_record: bool,
    update_record: bool,
    export_data: bool,
    view_history: bool,
}

impl CapabilitySet {
    /// Resolves the capability set for a normalized role.
    ///
    /// Pure and total: `None` (an unknown or missing role) resolves to the
    /// all-false set, so uncertainty always denies.
    #[must_use]
    pub fn resolve(role: Option<Role>) -> Self {
        match role {
            Some(Role::Admin) => Self {
                manage_users: true,
                create_table: true,
                update_table: true,
                delete_table: true,
                view_history: true,
                ..Self::default()
            },
            Some(Role::Manager) => Self {
                create_table: true,
                update_table: true,
                delete_table: true,
                view_history: true,
                ..Self::default()
            },
            Some(Role::Curator) => Self {
                create_record: true,
                update_record: true,
                view_history: true,
                ..Self::default()
            },
            Some(Role::Viewer) => Self {
                export_data: true,
                ..Self::default()
            },
            None => Self::default(),
        }
    }

    /// Returns the all-false capability set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns one named permission bit.
    #[must_use]
    pub fn get(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageUsers => self.manage_users,
            Capability::CreateTable => self.create_table,
            Capability::UpdateTable => self.update_table,
            Capability::DeleteTable => self.delete_table,
            Capability::CreateRecord => self.create_record,
            Capability::UpdateRecord => self.update_record,
            Capability::ExportData => self.export_data,
            Capability::ViewHistory => self.view_history,
        }
    }

    /// Returns whether the role may create entities through an editor.
    ///
    /// Table-level and record-level creation are alternative routes to the
    /// same mutating action; either one grants it.
    #[must_use]
    pub fn permits_create(&self) -> bool {
        self.create_table || self.create_record
    }

    /// Returns whether the role may update entities through an editor.
    #[must_use]
    pub fn permits_update(&self) -> bool {
        self.update_table || self.update_record
    }

    /// Returns whether the role may delete entities.
    #[must_use]
    pub fn permits_delete(&self) -> bool {
        self.delete_table
    }
}

/// Returns one permission bit for a normalized role.
#[must_use]
pub fn has_capability(role: Option<Role>, capability: Capability) -> bool {
    CapabilitySet::resolve(role).get(capability)
}
