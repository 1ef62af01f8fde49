//! Subscription records
//!
//! Module access is driven by two kinds of records:
//!
//! - the organization-wide subscription, stored on [`Organization`]
//!   (plan, status, trial end, period end), which covers every module when
//!   the plan is a bundle;
//! - per-module [`AppSubscription`] records keyed by
//!   `(organization_id, app_id)`, which hold module trials and single-module
//!   purchases.
//!
//! Both are viewed through [`Subscription`] when access is evaluated.
//!
//! [`Organization`]: crate::Organization

use barkeep_rbac::AppId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Trial period (with or without a started trial)
    #[default]
    Trial,

    /// Paid and current
    Active,

    /// Last payment failed
    PastDue,

    /// Cancelled, access revoked
    Cancelled,

    /// Trial ran out without conversion
    Expired,

    /// Cancelled at period end; paid access runs until then
    Cancelling,
}

impl SubscriptionStatus {
    /// Parse status from string representation.
    ///
    /// Accepts the billing provider's spellings (`canceled`, `past-due`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "trial" | "trialing" => Some(Self::Trial),
            "active" => Some(Self::Active),
            "past_due" => Some(Self::PastDue),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            "expired" => Some(Self::Expired),
            "cancelling" | "canceling" => Some(Self::Cancelling),
            _ => None,
        }
    }

    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Cancelling => "cancelling",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a subscription record covers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", tag = "type", content = "app")]
pub enum SubscriptionScope {
    /// Every module (organization-wide subscription)
    Bundle,
    /// A single module
    App(AppId),
}

/// Read-only view of a subscription used by the access evaluator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    /// What the record covers
    pub scope: SubscriptionScope,

    /// Current status
    pub status: SubscriptionStatus,

    /// End of the trial, if one was started
    pub trial_ends_at: Option<DateTime<Utc>>,

    /// End of the current paid period
    pub current_period_end: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Whether the record is in its trial phase.
    pub fn is_trial(&self) -> bool {
        self.status == SubscriptionStatus::Trial
    }

    /// Whether a started trial is still running at `now`.
    pub fn is_trial_active(&self, now: DateTime<Utc>) -> bool {
        self.is_trial() && self.trial_ends_at.is_some_and(|end| now < end)
    }

    /// Whether paid access is in effect at `now`.
    ///
    /// `Active` always counts. `Cancelling` counts until the end of the paid
    /// period; without a known period end it does not.
    pub fn is_paid_access(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            SubscriptionStatus::Active => true,
            SubscriptionStatus::Cancelling => self.current_period_end.is_some_and(|end| now < end),
            _ => false,
        }
    }

    /// Whole days left in the trial, rounded up. `None` outside a running
    /// trial.
    pub fn trial_days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        if !self.is_trial_active(now) {
            return None;
        }
        let remaining = self.trial_ends_at? - now;
        let days = remaining.num_days();
        if remaining > Duration::days(days) {
            Some(days + 1)
        } else {
            Some(days)
        }
    }
}

/// Per-module subscription record keyed by `(organization_id, app_id)`.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use uuid::Uuid;
/// use barkeep_org::{AppSubscription, SubscriptionStatus};
/// use barkeep_rbac::AppId;
///
/// let now = Utc::now();
/// let trial = AppSubscription::start_trial(Uuid::now_v7(), AppId::GuestManager, now, 14);
/// assert_eq!(trial.status, SubscriptionStatus::Trial);
/// assert_eq!(trial.trial_ends_at, Some(now + Duration::days(14)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSubscription {
    /// Organization the record belongs to
    pub organization_id: Uuid,

    /// Module the record covers
    pub app_id: AppId,

    /// Current status
    pub status: SubscriptionStatus,

    /// When the module trial started
    pub trial_started_at: Option<DateTime<Utc>>,

    /// When the module trial ends
    pub trial_ends_at: Option<DateTime<Utc>>,

    /// End of the current paid period
    pub current_period_end: Option<DateTime<Utc>>,

    /// Billing provider subscription reference
    pub billing_subscription_id: Option<String>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl AppSubscription {
    /// Start a module trial of `days` days at `now`.
    pub fn start_trial(
        organization_id: Uuid,
        app_id: AppId,
        now: DateTime<Utc>,
        days: u32,
    ) -> Self {
        Self {
            organization_id,
            app_id,
            status: SubscriptionStatus::Trial,
            trial_started_at: Some(now),
            trial_ends_at: Some(now + Duration::days(i64::from(days))),
            current_period_end: None,
            billing_subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a paid single-module record.
    pub fn paid(
        organization_id: Uuid,
        app_id: AppId,
        now: DateTime<Utc>,
        current_period_end: DateTime<Utc>,
    ) -> Self {
        Self {
            organization_id,
            app_id,
            status: SubscriptionStatus::Active,
            trial_started_at: None,
            trial_ends_at: None,
            current_period_end: Some(current_period_end),
            billing_subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Evaluator view of this record.
    pub fn as_subscription(&self) -> Subscription {
        Subscription {
            scope: SubscriptionScope::App(self.app_id),
            status: self.status,
            trial_ends_at: self.trial_ends_at,
            current_period_end: self.current_period_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial_ending(end: DateTime<Utc>) -> Subscription {
        Subscription {
            scope: SubscriptionScope::Bundle,
            status: SubscriptionStatus::Trial,
            trial_ends_at: Some(end),
            current_period_end: None,
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(SubscriptionStatus::parse("canceled"), Some(SubscriptionStatus::Cancelled));
        assert_eq!(SubscriptionStatus::parse("past-due"), Some(SubscriptionStatus::PastDue));
        assert_eq!(SubscriptionStatus::parse("trialing"), Some(SubscriptionStatus::Trial));
        assert_eq!(SubscriptionStatus::parse("paused"), None);
    }

    #[test]
    fn test_trial_boundaries() {
        let now = Utc::now();
        assert!(trial_ending(now + Duration::hours(1)).is_trial_active(now));
        assert!(!trial_ending(now).is_trial_active(now));
        assert!(!trial_ending(now - Duration::seconds(1)).is_trial_active(now));

        let never_started = Subscription {
            trial_ends_at: None,
            ..trial_ending(now)
        };
        assert!(!never_started.is_trial_active(now));
    }

    #[test]
    fn test_trial_days_remaining_rounds_up() {
        let now = Utc::now();
        assert_eq!(trial_ending(now + Duration::hours(1)).trial_days_remaining(now), Some(1));
        assert_eq!(trial_ending(now + Duration::days(14)).trial_days_remaining(now), Some(14));
        assert_eq!(
            trial_ending(now + Duration::days(2) + Duration::minutes(1)).trial_days_remaining(now),
            Some(3)
        );
        assert_eq!(trial_ending(now - Duration::hours(1)).trial_days_remaining(now), None);
    }

    #[test]
    fn test_paid_access() {
        let now = Utc::now();
        let mut sub = Subscription {
            scope: SubscriptionScope::App(AppId::Inventory),
            status: SubscriptionStatus::Active,
            trial_ends_at: None,
            current_period_end: None,
        };
        assert!(sub.is_paid_access(now));

        sub.status = SubscriptionStatus::Cancelling;
        assert!(!sub.is_paid_access(now));
        sub.current_period_end = Some(now + Duration::days(3));
        assert!(sub.is_paid_access(now));
        sub.current_period_end = Some(now - Duration::days(3));
        assert!(!sub.is_paid_access(now));

        for status in [
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Expired,
        ] {
            sub.status = status;
            sub.current_period_end = Some(now + Duration::days(3));
            assert!(!sub.is_paid_access(now));
        }
    }

    #[test]
    fn test_app_subscription_view() {
        let now = Utc::now();
        let org_id = Uuid::now_v7();
        let record =
            AppSubscription::paid(org_id, AppId::Consumption, now, now + Duration::days(30));
        let view = record.as_subscription();

        assert_eq!(view.scope, SubscriptionScope::App(AppId::Consumption));
        assert!(view.is_paid_access(now));
        assert!(!view.is_trial());
    }
}
