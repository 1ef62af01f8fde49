//! Usage-limit checks
//!
//! Plans cap how many users, inventory items and storage areas an
//! organization may hold. A stored limit of `-1` means unlimited, and
//! grandfathered organizations are never capped.

use barkeep_org::{Organization, ResourceKind, ResourceLimits};
use serde::{Deserialize, Serialize};

use crate::error::{AccessError, AccessResult};

/// Outcome of a usage-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitResult {
    /// Resource that was checked
    pub resource: ResourceKind,

    /// Whether one more can be added
    pub allowed: bool,

    /// Current count
    pub current: u64,

    /// Limit as stored on the organization (`-1` = unlimited)
    pub limit: i32,

    /// Whether the caller should offer an upgrade
    pub upgrade_required: bool,
}

impl LimitResult {
    /// Whether the limit is unlimited.
    pub fn is_unlimited(&self) -> bool {
        self.limit == ResourceLimits::UNLIMITED
    }

    /// Convert a rejected check into [`AccessError::LimitReached`].
    pub fn into_result(self) -> AccessResult<Self> {
        if self.allowed {
            return Ok(self);
        }
        Err(AccessError::LimitReached {
            resource: self.resource,
            current: self.current,
            limit: u32::try_from(self.limit).unwrap_or(0),
        })
    }
}

/// Check whether `organization` may add one more `kind` given the
/// `current` count.
///
/// # Examples
///
/// ```
/// use barkeep_access::evaluate_limit;
/// use barkeep_org::{Organization, ResourceKind};
///
/// let org = Organization::new("Corner Bar", "corner-bar");
/// // free plan: one user
/// assert!(evaluate_limit(&org, ResourceKind::Users, 0).allowed);
/// assert!(!evaluate_limit(&org, ResourceKind::Users, 1).allowed);
/// ```
pub fn evaluate_limit(
    organization: &Organization,
    kind: ResourceKind,
    current: u64,
) -> LimitResult {
    let limit = organization.limits.raw(kind);

    let allowed = organization.grandfathered
        || match organization.limit_for(kind) {
            None => true,
            Some(max) => current < u64::from(max),
        };

    LimitResult {
        resource: kind,
        allowed,
        current,
        limit,
        upgrade_required: !allowed,
    }
}

/// The limit a conditional insert should enforce, `None` when uncapped.
pub(crate) fn effective_limit(organization: &Organization, kind: ResourceKind) -> Option<u32> {
    if organization.grandfathered {
        return None;
    }
    organization.limit_for(kind)
}
