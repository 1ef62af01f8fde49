//! # Permissions
//!
//! Core permission types and sets. A permission combines an application
//! module with an action.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::actions::Action;
use crate::apps::AppId;

/// A permission is a combination of app and action.
///
/// # Example
///
/// ```
/// use barkeep_rbac::{Action, AppId, Permission};
///
/// let perm = Permission::new(AppId::Inventory, Action::View);
/// assert_eq!(perm.to_string(), "inventory:view");
/// assert_eq!(Permission::parse("inventory:view"), Some(perm));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    /// The module this permission applies to.
    pub app: AppId,
    /// The action allowed inside the module.
    pub action: Action,
}

impl Permission {
    /// Create a new permission.
    pub fn new(app: AppId, action: Action) -> Self {
        Self { app, action }
    }

    /// Parse from string (e.g., "inventory:view").
    pub fn parse(s: &str) -> Option<Self> {
        let (app, action) = s.split_once(':')?;
        Some(Self {
            app: AppId::parse(app)?,
            action: Action::parse(action)?,
        })
    }

    /// Check if this permission grants another one.
    ///
    /// Apps must match; the action must match or imply the other action.
    pub fn grants(&self, other: &Permission) -> bool {
        self.app == other.app && (self.action == other.action || self.action.implies(other.action))
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.app.as_str(), self.action.as_str())
    }
}

/// A set of permissions attached to an access decision.
///
/// Stored as strings so the set serializes as a flat list
/// (`["inventory:view", "inventory:edit"]`).
///
/// # Example
///
/// ```
/// use barkeep_rbac::{Action, AppId, Permission, PermissionSet};
///
/// let set = PermissionSet::full_access(AppId::GuestManager);
/// assert!(set.has(&Permission::new(AppId::GuestManager, Action::Delete)));
/// assert!(!set.has(&Permission::new(AppId::Inventory, Action::View)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: HashSet<String>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            permissions: HashSet::new(),
        }
    }

    /// Build a set holding the given actions for one app.
    pub fn for_actions(app: AppId, actions: &[Action]) -> Self {
        actions
            .iter()
            .map(|action| Permission::new(app, *action))
            .collect()
    }

    /// Every action on one app, spelled out explicitly.
    pub fn full_access(app: AppId) -> Self {
        Self::for_actions(app, &Action::all())
    }

    /// Add a permission to the set.
    pub fn add(&mut self, permission: Permission) {
        self.permissions.insert(permission.to_string());
    }

    /// Remove a permission from the set.
    ///
    /// Returns `true` if the permission was present.
    pub fn remove(&mut self, permission: &Permission) -> bool {
        self.permissions.remove(&permission.to_string())
    }

    /// Check if the set grants a permission, directly or by implication.
    pub fn has(&self, permission: &Permission) -> bool {
        if self.permissions.contains(&permission.to_string()) {
            return true;
        }

        Action::all()
            .into_iter()
            .filter(|action| action.implies(permission.action))
            .any(|action| {
                self.permissions
                    .contains(&Permission::new(permission.app, action).to_string())
            })
    }

    /// Get all permissions in the set, sorted by app then action.
    pub fn all(&self) -> Vec<Permission> {
        let mut perms: Vec<Permission> = self
            .permissions
            .iter()
            .filter_map(|s| Permission::parse(s))
            .collect();
        perms.sort_by_key(|p| (p.app, p.action));
        perms
    }

    /// Actions granted explicitly for an app.
    pub fn actions_for(&self, app: AppId) -> Vec<Action> {
        self.all()
            .into_iter()
            .filter(|p| p.app == app)
            .map(|p| p.action)
            .collect()
    }

    /// Merge another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().cloned());
    }

    /// Get the count of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        let mut set = PermissionSet::new();
        for perm in iter {
            set.add(perm);
        }
        set
    }
}
