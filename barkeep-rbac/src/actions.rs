//! # Actions
//!
//! Defines the actions a user can perform inside an application module.

use serde::{Deserialize, Serialize};

/// Actions that can be performed inside a module.
///
/// - **View**: Browse module data
/// - **Create**: Add new records (bottles, guests, pours)
/// - **Edit**: Modify existing records
/// - **Delete**: Remove records
/// - **Export**: Download reports and lists
/// - **Admin**: Configure the module itself
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Browse module data.
    View,

    /// Add new records.
    Create,

    /// Modify existing records.
    Edit,

    /// Remove records.
    Delete,

    /// Download reports and lists.
    Export,

    /// Configure the module.
    ///
    /// Implies every other action.
    Admin,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Export => "export",
            Action::Admin => "admin",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports aliases)
    ///
    /// # Example
    ///
    /// ```
    /// use barkeep_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("view"), Some(Action::View));
    /// assert_eq!(Action::parse("read"), Some(Action::View)); // Alias
    /// assert_eq!(Action::parse("update"), Some(Action::Edit)); // Alias
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "view" | "read" | "get" => Some(Action::View),
            "create" | "add" | "new" => Some(Action::Create),
            "edit" | "update" | "write" | "modify" => Some(Action::Edit),
            "delete" | "remove" | "destroy" => Some(Action::Delete),
            "export" | "download" => Some(Action::Export),
            "admin" | "manage" | "administer" => Some(Action::Admin),
            _ => None,
        }
    }

    /// Get all actions, lowest to highest.
    pub fn all() -> Vec<Self> {
        vec![
            Action::View,
            Action::Create,
            Action::Edit,
            Action::Delete,
            Action::Export,
            Action::Admin,
        ]
    }

    /// Check if this action implies another action.
    ///
    /// - `Admin` implies all other actions
    /// - `Create`, `Edit`, `Delete` and `Export` imply `View`
    ///
    /// # Example
    ///
    /// ```
    /// use barkeep_rbac::actions::Action;
    ///
    /// assert!(Action::Admin.implies(Action::Delete));
    /// assert!(Action::Edit.implies(Action::View));
    /// assert!(!Action::View.implies(Action::Edit));
    /// ```
    pub fn implies(&self, other: Action) -> bool {
        match self {
            Action::Admin => true,
            Action::Create | Action::Edit | Action::Delete | Action::Export => {
                other == Action::View
            }
            Action::View => false,
        }
    }

    /// Check if this action modifies module data.
    pub fn is_write(&self) -> bool {
        matches!(self, Action::Create | Action::Edit | Action::Delete)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
