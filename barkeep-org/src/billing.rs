//! Billing-driven subscription transitions
//!
//! Billing provider events (already verified and parsed by the webhook
//! layer) are mapped onto subscription state here. The same transitions
//! apply to the organization-wide subscription and to single-module
//! records through [`BillableSubscription`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::organization::Organization;
use crate::plans::SubscriptionPlan;
use crate::subscription::{AppSubscription, SubscriptionStatus};

/// A parsed billing provider event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BillingEvent {
    /// Checkout finished and the first payment succeeded
    CheckoutCompleted {
        /// Purchased plan (organization-wide records only)
        plan: Option<SubscriptionPlan>,
        /// End of the first paid period
        period_end: DateTime<Utc>,
    },

    /// A renewal payment succeeded
    SubscriptionRenewed {
        /// End of the new paid period
        period_end: DateTime<Utc>,
    },

    /// A payment attempt failed
    PaymentFailed,

    /// The customer cancelled; access runs until the period end
    CancellationScheduled {
        /// End of the paid period
        period_end: DateTime<Utc>,
    },

    /// A scheduled cancellation was withdrawn
    CancellationReverted,

    /// The subscription was deleted at the provider
    SubscriptionEnded,

    /// The trial ran out without a purchase
    TrialExpired,
}

impl BillingEvent {
    /// Event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            BillingEvent::CheckoutCompleted { .. } => "checkout_completed",
            BillingEvent::SubscriptionRenewed { .. } => "subscription_renewed",
            BillingEvent::PaymentFailed => "payment_failed",
            BillingEvent::CancellationScheduled { .. } => "cancellation_scheduled",
            BillingEvent::CancellationReverted => "cancellation_reverted",
            BillingEvent::SubscriptionEnded => "subscription_ended",
            BillingEvent::TrialExpired => "trial_expired",
        }
    }
}

/// Result of applying a billing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status before the event
    pub from: SubscriptionStatus,
    /// Status after the event
    pub to: SubscriptionStatus,
}

impl StatusChange {
    /// Whether the status changed.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// A record whose status is driven by billing events.
pub trait BillableSubscription {
    /// Current status.
    fn status(&self) -> SubscriptionStatus;

    /// Replace the status.
    fn set_status(&mut self, status: SubscriptionStatus);

    /// Replace the end of the paid period.
    fn set_period_end(&mut self, period_end: Option<DateTime<Utc>>);

    /// Apply a purchased plan. Records without a plan ignore it.
    fn set_plan(&mut self, _plan: SubscriptionPlan) {}

    /// Stamp the update time.
    fn touch(&mut self, now: DateTime<Utc>);
}

impl BillableSubscription for Organization {
    fn status(&self) -> SubscriptionStatus {
        self.subscription_status
    }

    fn set_status(&mut self, status: SubscriptionStatus) {
        self.subscription_status = status;
    }

    fn set_period_end(&mut self, period_end: Option<DateTime<Utc>>) {
        self.current_period_end = period_end;
    }

    fn set_plan(&mut self, plan: SubscriptionPlan) {
        self.change_plan(plan);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl BillableSubscription for AppSubscription {
    fn status(&self) -> SubscriptionStatus {
        self.status
    }

    fn set_status(&mut self, status: SubscriptionStatus) {
        self.status = status;
    }

    fn set_period_end(&mut self, period_end: Option<DateTime<Utc>>) {
        self.current_period_end = period_end;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Apply a billing event to a subscription record.
///
/// `TrialExpired` only moves records that are still in trial; a record
/// that was bought in the meantime keeps its status.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use barkeep_org::{apply_billing_event, BillingEvent, Organization, SubscriptionStatus};
///
/// let mut org = Organization::new("Test", "test");
/// let now = Utc::now();
/// let change = apply_billing_event(
///     &mut org,
///     &BillingEvent::CancellationScheduled { period_end: now + Duration::days(10) },
///     now,
/// );
/// assert_eq!(change.to, SubscriptionStatus::Cancelling);
/// ```
pub fn apply_billing_event<T: BillableSubscription + ?Sized>(
    target: &mut T,
    event: &BillingEvent,
    now: DateTime<Utc>,
) -> StatusChange {
    let from = target.status();

    match event {
        BillingEvent::CheckoutCompleted { plan, period_end } => {
            if let Some(plan) = plan {
                target.set_plan(*plan);
            }
            target.set_status(SubscriptionStatus::Active);
            target.set_period_end(Some(*period_end));
        }
        BillingEvent::SubscriptionRenewed { period_end } => {
            target.set_status(SubscriptionStatus::Active);
            target.set_period_end(Some(*period_end));
        }
        BillingEvent::PaymentFailed => target.set_status(SubscriptionStatus::PastDue),
        BillingEvent::CancellationScheduled { period_end } => {
            target.set_status(SubscriptionStatus::Cancelling);
            target.set_period_end(Some(*period_end));
        }
        BillingEvent::CancellationReverted => {
            if from == SubscriptionStatus::Cancelling {
                target.set_status(SubscriptionStatus::Active);
            }
        }
        BillingEvent::SubscriptionEnded => target.set_status(SubscriptionStatus::Cancelled),
        BillingEvent::TrialExpired => {
            if from == SubscriptionStatus::Trial {
                target.set_status(SubscriptionStatus::Expired);
            }
        }
    }

    target.touch(now);
    StatusChange {
        from,
        to: target.status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barkeep_rbac::AppId;
    use chrono::Duration;
    use uuid::Uuid;

    #[test]
    fn test_checkout_sets_plan_and_period() {
        let now = Utc::now();
        let mut org = Organization::new("Test", "test");
        org.start_trial(now, 30);

        let change = apply_billing_event(
            &mut org,
            &BillingEvent::CheckoutCompleted {
                plan: Some(SubscriptionPlan::Professional),
                period_end: now + Duration::days(30),
            },
            now,
        );

        assert!(change.changed());
        assert_eq!(change.from, SubscriptionStatus::Trial);
        assert_eq!(org.subscription_status, SubscriptionStatus::Active);
        assert_eq!(org.plan, SubscriptionPlan::Professional);
        assert_eq!(org.current_period_end, Some(now + Duration::days(30)));
    }

    #[test]
    fn test_cancellation_round_trip() {
        let now = Utc::now();
        let mut org = Organization::new("Test", "test");
        org.subscription_status = SubscriptionStatus::Active;

        apply_billing_event(
            &mut org,
            &BillingEvent::CancellationScheduled {
                period_end: now + Duration::days(5),
            },
            now,
        );
        assert_eq!(org.subscription_status, SubscriptionStatus::Cancelling);

        let change = apply_billing_event(&mut org, &BillingEvent::CancellationReverted, now);
        assert_eq!(change.to, SubscriptionStatus::Active);
    }

    #[test]
    fn test_revert_only_from_cancelling() {
        let now = Utc::now();
        let mut org = Organization::new("Test", "test");
        org.subscription_status = SubscriptionStatus::Cancelled;

        let change = apply_billing_event(&mut org, &BillingEvent::CancellationReverted, now);
        assert!(!change.changed());
    }

    #[test]
    fn test_trial_expired_only_from_trial() {
        let now = Utc::now();
        let mut record = AppSubscription::start_trial(Uuid::now_v7(), AppId::Inventory, now, 14);
        let change = apply_billing_event(&mut record, &BillingEvent::TrialExpired, now);
        assert_eq!(change.to, SubscriptionStatus::Expired);

        let mut paid =
            AppSubscription::paid(Uuid::now_v7(), AppId::Inventory, now, now + Duration::days(30));
        let change = apply_billing_event(&mut paid, &BillingEvent::TrialExpired, now);
        assert!(!change.changed());
        assert_eq!(paid.status, SubscriptionStatus::Active);
    }

    #[test]
    fn test_app_record_ignores_plan() {
        let now = Utc::now();
        let mut record = AppSubscription::start_trial(Uuid::now_v7(), AppId::Consumption, now, 14);
        apply_billing_event(
            &mut record,
            &BillingEvent::CheckoutCompleted {
                plan: Some(SubscriptionPlan::Enterprise),
                period_end: now + Duration::days(30),
            },
            now,
        );
        assert_eq!(record.status, SubscriptionStatus::Active);
    }

    #[test]
    fn test_payment_failure_and_end() {
        let now = Utc::now();
        let mut org = Organization::new("Test", "test");
        org.subscription_status = SubscriptionStatus::Active;

        apply_billing_event(&mut org, &BillingEvent::PaymentFailed, now);
        assert_eq!(org.subscription_status, SubscriptionStatus::PastDue);

        apply_billing_event(&mut org, &BillingEvent::SubscriptionEnded, now);
        assert_eq!(org.subscription_status, SubscriptionStatus::Cancelled);
    }
}
