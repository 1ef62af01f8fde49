//! User domain model
//!
//! A user belongs to at most one organization at a time. Removing a user
//! from their organization detaches and anonymizes the record instead of
//! deleting it, so historical references (counts, pours) stay valid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::UserRole;

/// A user account.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use barkeep_org::{User, UserRole};
///
/// let org_id = Uuid::now_v7();
/// let user = User::new("sam@cheers.bar", org_id, UserRole::Staff);
/// assert!(user.belongs_to(org_id));
/// assert!(!user.platform_admin);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Login email
    pub email: String,

    /// Name shown in the team list
    pub display_name: Option<String>,

    /// Role within the organization
    pub role: UserRole,

    /// Current organization (None after removal)
    pub organization_id: Option<Uuid>,

    /// Global operator flag, independent of any organization
    #[serde(default)]
    pub platform_admin: bool,

    /// Salted hash of the quick-login PIN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_hash: Option<String>,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user in an organization.
    pub fn new(email: impl Into<String>, organization_id: Uuid, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            display_name: None,
            role,
            organization_id: Some(organization_id),
            platform_admin: false,
            pin_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a platform operator with no organization.
    pub fn platform_admin(email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            display_name: None,
            role: UserRole::Viewer,
            organization_id: None,
            platform_admin: true,
            pin_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Check if the user currently belongs to an organization.
    pub fn belongs_to(&self, organization_id: Uuid) -> bool {
        self.organization_id == Some(organization_id)
    }

    /// Check if both users belong to the same organization.
    ///
    /// Users without an organization never share one.
    pub fn same_organization(&self, other: &User) -> bool {
        matches!(
            (self.organization_id, other.organization_id),
            (Some(a), Some(b)) if a == b
        )
    }

    /// Change the role.
    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    /// Replace the stored PIN hash.
    pub fn set_pin_hash(&mut self, pin_hash: impl Into<String>) {
        self.pin_hash = Some(pin_hash.into());
        self.updated_at = Utc::now();
    }

    /// Detach the user from their organization and scrub personal data.
    ///
    /// The ID is kept so historical records still resolve.
    pub fn anonymize(&mut self) {
        self.email = format!("removed-{}@users.invalid", self.id.simple());
        self.display_name = None;
        self.organization_id = None;
        self.pin_hash = None;
        self.role = UserRole::Viewer;
        self.updated_at = Utc::now();
    }

    /// Check if the record was anonymized.
    pub fn is_anonymized(&self) -> bool {
        self.organization_id.is_none() && self.email.ends_with("@users.invalid")
    }
}
