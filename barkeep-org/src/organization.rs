//! Organization domain models
//!
//! This module provides the Organization entity: the tenant record holding
//! the organization-wide subscription (plan, status, trial, paid period),
//! resource limits and the grandfather flag. Organizations are never
//! hard-deleted; their lifecycle is carried by the subscription status.

use barkeep_rbac::AppId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plans::{ResourceKind, ResourceLimits, SubscriptionPlan};
use crate::subscription::{Subscription, SubscriptionScope, SubscriptionStatus};

/// An organization represents a tenant (a venue or a venue group).
///
/// # Examples
///
/// ```
/// use barkeep_org::{Organization, SubscriptionPlan, SubscriptionStatus};
///
/// let org = Organization::new("Copper Still", "copper-still");
/// assert_eq!(org.plan, SubscriptionPlan::Free);
/// assert_eq!(org.subscription_status, SubscriptionStatus::Trial);
/// assert!(org.trial_ends_at.is_none());
/// assert!(!org.grandfathered);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    /// Unique identifier for the organization
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// URL-friendly slug (unique across the platform)
    pub slug: String,

    /// Subscription plan
    pub plan: SubscriptionPlan,

    /// Status of the organization-wide subscription
    pub subscription_status: SubscriptionStatus,

    /// End of the organization-wide trial (None = never started)
    pub trial_ends_at: Option<DateTime<Utc>>,

    /// End of the current paid period
    pub current_period_end: Option<DateTime<Utc>>,

    /// Resource limits (-1 = unlimited)
    pub limits: ResourceLimits,

    /// Bypass every subscription and limit check
    #[serde(default)]
    pub grandfathered: bool,

    /// Billing provider customer reference
    pub billing_customer_id: Option<String>,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Creates a new organization on the free plan with no trial started.
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        let plan = SubscriptionPlan::Free;
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            slug: slug.into(),
            plan,
            subscription_status: SubscriptionStatus::Trial,
            trial_ends_at: None,
            current_period_end: None,
            limits: plan.default_limits(),
            grandfathered: false,
            billing_customer_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the organization as grandfathered.
    pub fn grandfathered(mut self) -> Self {
        self.grandfathered = true;
        self
    }

    /// Whether an organization-wide trial was ever started, or the
    /// organization moved past the trial phase.
    pub fn has_started_subscription(&self) -> bool {
        self.trial_ends_at.is_some() || self.subscription_status != SubscriptionStatus::Trial
    }

    /// Start the organization-wide trial of `days` days at `now`.
    ///
    /// Moves the organization onto the trial plan and its limits.
    pub fn start_trial(&mut self, now: DateTime<Utc>, days: u32) {
        self.change_plan(SubscriptionPlan::Trial);
        self.subscription_status = SubscriptionStatus::Trial;
        self.trial_ends_at = Some(now + Duration::days(i64::from(days)));
        self.updated_at = now;
    }

    /// Switch plans and reset the limits to the plan defaults.
    ///
    /// Grandfathered organizations keep their existing limits.
    pub fn change_plan(&mut self, plan: SubscriptionPlan) {
        self.plan = plan;
        if !self.grandfathered {
            self.limits = plan.default_limits();
        }
        self.updated_at = Utc::now();
    }

    /// Limit for a resource, `None` when unlimited.
    pub fn limit_for(&self, kind: ResourceKind) -> Option<u32> {
        self.limits.limit_for(kind)
    }

    /// The organization-wide subscription as it applies to `app`.
    ///
    /// Returns `None` when the plan does not cover `app` or when no
    /// subscription was ever started. Bundle plans report a bundle scope;
    /// a plan covering only some modules reports the module's scope.
    pub fn plan_subscription(&self, app: AppId) -> Option<Subscription> {
        if !self.plan.covers(app) || !self.has_started_subscription() {
            return None;
        }
        let scope = if self.plan.includes_all_apps() {
            SubscriptionScope::Bundle
        } else {
            SubscriptionScope::App(app)
        };
        Some(Subscription {
            scope,
            status: self.subscription_status,
            trial_ends_at: self.trial_ends_at,
            current_period_end: self.current_period_end,
        })
    }
}
