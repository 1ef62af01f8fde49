//! User roles
//!
//! This module defines the role hierarchy inside an organization.
//! Roles gate team management only; module access is decided by the
//! organization's subscriptions.

use serde::{Deserialize, Serialize};

/// User role within an organization.
///
/// The hierarchy is: Viewer < Staff < Manager < Owner
///
/// # Permission Model
///
/// - **Viewer**: Read-only access to module data
/// - **Staff**: Day-to-day work (counts, pours, check-ins)
/// - **Manager**: Manages the team and module data
/// - **Owner**: Full control, including other owners and billing
///
/// # Examples
///
/// ```
/// use barkeep_org::UserRole;
///
/// assert!(UserRole::Manager.can_manage_team());
/// assert!(!UserRole::Staff.can_manage_team());
/// assert!(UserRole::Owner > UserRole::Manager);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Read-only access
    Viewer = 1,

    /// Front-of-house and back-of-house staff
    Staff = 2,

    /// Bar or venue manager
    Manager = 3,

    /// Organization owner
    Owner = 4,
}

impl UserRole {
    /// Check if this role can invite, remove, and re-role team members.
    ///
    /// # Returns
    ///
    /// `true` for Manager and Owner roles
    pub fn can_manage_team(&self) -> bool {
        *self >= UserRole::Manager
    }

    /// Check if this role is the owner role.
    pub fn is_owner(&self) -> bool {
        *self == UserRole::Owner
    }

    /// Check if this role can create and edit module data.
    pub fn can_edit(&self) -> bool {
        *self >= UserRole::Staff
    }

    /// Parse role from string representation (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use barkeep_org::UserRole;
    ///
    /// assert_eq!(UserRole::parse("MANAGER"), Some(UserRole::Manager));
    /// assert_eq!(UserRole::parse("bartender"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "staff" => Some(Self::Staff),
            "manager" => Some(Self::Manager),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Staff => "staff",
            Self::Manager => "manager",
            Self::Owner => "owner",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Viewer => "Viewer",
            Self::Staff => "Staff",
            Self::Manager => "Manager",
            Self::Owner => "Owner",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Staff
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(UserRole::Owner > UserRole::Manager);
        assert!(UserRole::Manager > UserRole::Staff);
        assert!(UserRole::Staff > UserRole::Viewer);
    }

    #[test]
    fn test_role_capabilities() {
        assert!(!UserRole::Viewer.can_edit());
        assert!(UserRole::Staff.can_edit());
        assert!(!UserRole::Staff.can_manage_team());
        assert!(UserRole::Manager.can_manage_team());
        assert!(!UserRole::Manager.is_owner());
        assert!(UserRole::Owner.is_owner());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(UserRole::parse("owner"), Some(UserRole::Owner));
        assert_eq!(UserRole::parse("Viewer"), Some(UserRole::Viewer));
        assert_eq!(UserRole::parse("admin"), None);
    }
}
