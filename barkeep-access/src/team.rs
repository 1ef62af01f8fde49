//! Team-management gate
//!
//! Decides whether one user may invite, re-role, remove, or reset the PIN
//! of another. Checks run in a fixed order so the most fundamental
//! violation is the one reported:
//!
//! ```text
//! 1. actor has no organization          -> OrganizationNotFound
//! 2. target in another organization     -> CrossOrganizationViolation
//! 3. actor removes / re-roles self      -> SelfModification
//! 4. actor below manager                -> InsufficientRole
//! 5. owner assigned, removed, re-roled  -> InsufficientRole unless actor is owner
//! ```
//!
//! A cross-organization target is rejected whatever the actor's role.

use barkeep_org::{User, UserRole};
use serde::{Deserialize, Serialize};

use crate::error::{AccessError, AccessResult};

/// Action one user takes on another member of the team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TeamAction {
    /// Give the target a new role
    ChangeRole {
        /// Role to assign
        new_role: UserRole,
    },

    /// Remove the target from the organization
    Remove,

    /// Set the target's quick-login PIN
    UpdatePin,
}

impl TeamAction {
    /// Get string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamAction::ChangeRole { .. } => "change_role",
            TeamAction::Remove => "remove",
            TeamAction::UpdatePin => "update_pin",
        }
    }
}

impl std::fmt::Display for TeamAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that `actor` may invite a new member with `role`.
///
/// The users limit is checked separately, when the member is inserted.
pub fn authorize_invite(actor: &User, role: UserRole) -> AccessResult<()> {
    if actor.organization_id.is_none() {
        return Err(AccessError::OrganizationNotFound);
    }

    require_team_manager(actor)?;

    if role.is_owner() && !actor.role.is_owner() {
        return Err(AccessError::InsufficientRole(
            "only an owner can invite another owner".to_string(),
        ));
    }

    Ok(())
}

/// Check that `actor` may perform `action` on `target`.
///
/// # Examples
///
/// ```
/// use barkeep_access::{authorize_team_action, AccessError, TeamAction};
/// use barkeep_org::{User, UserRole};
/// use uuid::Uuid;
///
/// let org = Uuid::now_v7();
/// let manager = User::new("manager@bar.test", org, UserRole::Manager);
/// let owner = User::new("owner@bar.test", org, UserRole::Owner);
///
/// let err = authorize_team_action(&manager, &owner, &TeamAction::Remove).unwrap_err();
/// assert!(matches!(err, AccessError::InsufficientRole(_)));
/// ```
pub fn authorize_team_action(actor: &User, target: &User, action: &TeamAction) -> AccessResult<()> {
    if actor.organization_id.is_none() {
        return Err(AccessError::OrganizationNotFound);
    }

    if !actor.same_organization(target) {
        return Err(AccessError::CrossOrganizationViolation);
    }

    let is_self = actor.id == target.id;
    match action {
        TeamAction::Remove if is_self => {
            return Err(AccessError::SelfModification(
                "you cannot remove yourself from the organization".to_string(),
            ));
        }
        TeamAction::ChangeRole { .. } if is_self => {
            return Err(AccessError::SelfModification(
                "you cannot change your own role".to_string(),
            ));
        }
        // Anyone may set their own PIN.
        TeamAction::UpdatePin if is_self => return Ok(()),
        _ => {}
    }

    require_team_manager(actor)?;

    if actor.role.is_owner() {
        return Ok(());
    }

    if target.role.is_owner() {
        return Err(AccessError::InsufficientRole(format!(
            "only an owner can {} an owner",
            match action {
                TeamAction::ChangeRole { .. } => "change the role of",
                TeamAction::Remove => "remove",
                TeamAction::UpdatePin => "reset the PIN of",
            }
        )));
    }

    if let TeamAction::ChangeRole { new_role } = action {
        if new_role.is_owner() {
            return Err(AccessError::InsufficientRole(
                "only an owner can assign the owner role".to_string(),
            ));
        }
    }

    Ok(())
}

fn require_team_manager(actor: &User) -> AccessResult<()> {
    if actor.role.can_manage_team() {
        return Ok(());
    }
    Err(AccessError::InsufficientRole(format!(
        "{} cannot manage the team",
        actor.role.display_name()
    )))
}
