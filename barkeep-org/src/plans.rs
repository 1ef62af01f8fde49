//! Subscription plans and resource limits
//!
//! This module defines the plans an organization can subscribe to and the
//! per-resource limits attached to each plan.

use barkeep_rbac::AppId;
use serde::{Deserialize, Serialize};

/// Subscription plan for an organization.
///
/// - **Trial**: Organization-wide trial, every module unlocked
/// - **Starter**: Single-venue plan covering inventory; other modules are
///   purchased individually
/// - **Professional**: Bundle of every module
/// - **Enterprise**: Bundle with unlimited resources
/// - **Free**: No paid modules, smallest limits
///
/// # Examples
///
/// ```
/// use barkeep_org::{ResourceKind, SubscriptionPlan};
///
/// let limits = SubscriptionPlan::Starter.default_limits();
/// assert_eq!(limits.limit_for(ResourceKind::Users), Some(3));
/// assert!(SubscriptionPlan::Professional.includes_all_apps());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    /// Organization-wide trial
    Trial,

    /// Single-venue plan
    Starter,

    /// Every module for a growing venue
    Professional,

    /// Every module, unlimited resources
    Enterprise,

    /// Free plan
    #[default]
    Free,
}

impl SubscriptionPlan {
    /// Default resource limits for this plan.
    pub fn default_limits(&self) -> ResourceLimits {
        match self {
            SubscriptionPlan::Trial => ResourceLimits::new(5, 500, 10),
            SubscriptionPlan::Starter => ResourceLimits::new(3, 250, 5),
            SubscriptionPlan::Professional => ResourceLimits::new(15, 2000, 25),
            SubscriptionPlan::Enterprise => ResourceLimits::unlimited(),
            SubscriptionPlan::Free => ResourceLimits::new(1, 50, 2),
        }
    }

    /// Whether an organization-wide subscription on this plan covers every
    /// module (a "bundle").
    pub fn includes_all_apps(&self) -> bool {
        matches!(
            self,
            SubscriptionPlan::Trial | SubscriptionPlan::Professional | SubscriptionPlan::Enterprise
        )
    }

    /// Whether an organization-wide subscription on this plan covers `app`.
    ///
    /// ```
    /// use barkeep_org::SubscriptionPlan;
    /// use barkeep_rbac::AppId;
    ///
    /// assert!(SubscriptionPlan::Starter.covers(AppId::Inventory));
    /// assert!(!SubscriptionPlan::Starter.covers(AppId::GuestManager));
    /// ```
    pub fn covers(&self, app: AppId) -> bool {
        match self {
            SubscriptionPlan::Starter => app == AppId::Inventory,
            SubscriptionPlan::Free => false,
            _ => self.includes_all_apps(),
        }
    }

    /// Check if this is a paid plan.
    pub fn is_paid(&self) -> bool {
        matches!(
            self,
            SubscriptionPlan::Starter
                | SubscriptionPlan::Professional
                | SubscriptionPlan::Enterprise
        )
    }

    /// Parse plan from string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trial" => Some(SubscriptionPlan::Trial),
            "starter" | "basic" => Some(SubscriptionPlan::Starter),
            "professional" | "pro" => Some(SubscriptionPlan::Professional),
            "enterprise" => Some(SubscriptionPlan::Enterprise),
            "free" => Some(SubscriptionPlan::Free),
            _ => None,
        }
    }

    /// Get string representation of the plan.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Trial => "trial",
            SubscriptionPlan::Starter => "starter",
            SubscriptionPlan::Professional => "professional",
            SubscriptionPlan::Enterprise => "enterprise",
            SubscriptionPlan::Free => "free",
        }
    }

    /// Get a human-readable display name for the plan.
    pub fn display_name(&self) -> &'static str {
        match self {
            SubscriptionPlan::Trial => "Free Trial",
            SubscriptionPlan::Starter => "Starter",
            SubscriptionPlan::Professional => "Professional",
            SubscriptionPlan::Enterprise => "Enterprise",
            SubscriptionPlan::Free => "Free",
        }
    }
}

/// Resources whose count is capped per organization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Team members
    Users,

    /// Inventory items (bottles, kegs, products)
    Items,

    /// Storage areas (bars, cellars, walk-ins)
    StorageAreas,
}

impl ResourceKind {
    /// Get string representation of the resource kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::Items => "items",
            ResourceKind::StorageAreas => "storage_areas",
        }
    }

    /// Human-readable, plural resource name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Users => "team members",
            ResourceKind::Items => "inventory items",
            ResourceKind::StorageAreas => "storage areas",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-resource limits of an organization.
///
/// Stored the way the database stores them: `-1` means unlimited. Use
/// [`ResourceLimits::limit_for`] to get the `Option` view, where `None`
/// indicates unlimited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Maximum number of team members (-1 = unlimited)
    pub max_users: i32,

    /// Maximum number of inventory items (-1 = unlimited)
    pub max_items: i32,

    /// Maximum number of storage areas (-1 = unlimited)
    pub max_storage_areas: i32,
}

impl ResourceLimits {
    /// Sentinel for an unlimited resource.
    pub const UNLIMITED: i32 = -1;

    /// Create limits from raw values.
    pub const fn new(max_users: i32, max_items: i32, max_storage_areas: i32) -> Self {
        Self {
            max_users,
            max_items,
            max_storage_areas,
        }
    }

    /// Limits with every resource unlimited.
    pub const fn unlimited() -> Self {
        Self::new(Self::UNLIMITED, Self::UNLIMITED, Self::UNLIMITED)
    }

    /// Raw stored value for a resource.
    pub fn raw(&self, kind: ResourceKind) -> i32 {
        match kind {
            ResourceKind::Users => self.max_users,
            ResourceKind::Items => self.max_items,
            ResourceKind::StorageAreas => self.max_storage_areas,
        }
    }

    /// Limit for a resource, `None` when unlimited.
    ///
    /// Any negative value is read as unlimited.
    pub fn limit_for(&self, kind: ResourceKind) -> Option<u32> {
        u32::try_from(self.raw(kind)).ok()
    }

    /// Set the limit for a resource (`None` = unlimited).
    pub fn set(&mut self, kind: ResourceKind, limit: Option<u32>) {
        let value = limit
            .map(|l| i32::try_from(l).unwrap_or(i32::MAX))
            .unwrap_or(Self::UNLIMITED);
        match kind {
            ResourceKind::Users => self.max_users = value,
            ResourceKind::Items => self.max_items = value,
            ResourceKind::StorageAreas => self.max_storage_areas = value,
        }
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        SubscriptionPlan::default().default_limits()
    }
}
