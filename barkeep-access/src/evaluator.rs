//! Access evaluator
//!
//! Decides whether a user may enter a module from already-loaded records.
//! The checks run in a fixed order and the first match wins:
//!
//! ```text
//! 1. platform admin                  -> granted (bundle, every action)
//! 2. no organization, or not theirs  -> denied
//! 3. grandfathered                   -> granted
//! 4. no subscription record          -> trial-available
//! 5. trial running                   -> granted
//! 6. trial over                      -> trial-expired
//! 7. active / cancelling             -> granted (cancelling only until period end)
//! 8. anything else                   -> subscription-required
//! ```
//!
//! Both bypasses run before any date arithmetic, so absent trial dates
//! cannot affect them. Step 4 looks at the record picked by
//! [`resolve_subscription`].

use barkeep_org::{
    AppSubscription, Organization, Subscription, SubscriptionScope, SubscriptionStatus, User,
    UserRole,
};
use barkeep_rbac::{Action, AppId, PermissionSet};
use chrono::{DateTime, Utc};

use crate::decision::{AccessDecision, AccessStatus, SubscriptionType};

/// Module permissions for a role.
///
/// Roles never change whether access is granted, only what can be done
/// once inside.
///
/// # Examples
///
/// ```
/// use barkeep_access::role_permissions;
/// use barkeep_org::UserRole;
/// use barkeep_rbac::{Action, AppId, Permission};
///
/// let perms = role_permissions(UserRole::Staff, AppId::Inventory);
/// assert!(perms.has(&Permission::new(AppId::Inventory, Action::Edit)));
/// assert!(!perms.has(&Permission::new(AppId::Inventory, Action::Delete)));
/// ```
pub fn role_permissions(role: UserRole, app: AppId) -> PermissionSet {
    let actions: &[Action] = match role {
        UserRole::Viewer => &[Action::View],
        UserRole::Staff => &[Action::View, Action::Create, Action::Edit],
        UserRole::Manager => &[
            Action::View,
            Action::Create,
            Action::Edit,
            Action::Delete,
            Action::Export,
        ],
        UserRole::Owner => {
            return PermissionSet::full_access(app);
        }
    };
    PermissionSet::for_actions(app, actions)
}

/// Pick the subscription record that decides access to a module.
///
/// 1. The organization-wide subscription when it grants access right now
///    (paid and in good standing, or a running trial)
/// 2. The module's own record
/// 3. The organization-wide subscription in any other state (lapsed trial,
///    past due, cancelled)
///
/// The organization-wide subscription only counts when its plan covers
/// `app`. A module record belonging to another organization or module is
/// ignored.
pub fn resolve_subscription(
    organization: &Organization,
    app: AppId,
    app_subscription: Option<&AppSubscription>,
    now: DateTime<Utc>,
) -> Option<Subscription> {
    let organization_wide = organization.plan_subscription(app);
    if let Some(current) =
        organization_wide.filter(|s| s.is_paid_access(now) || s.is_trial_active(now))
    {
        return Some(current);
    }

    let module = app_subscription
        .filter(|s| s.organization_id == organization.id && s.app_id == app)
        .map(AppSubscription::as_subscription);

    module.or(organization_wide)
}

/// Evaluates module access.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessEvaluator;

impl AccessEvaluator {
    /// Create a new evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `user` may enter `app` at `now`.
    ///
    /// `organization` may be absent (platform admins, removed users).
    /// `app_subscription` is the `(organization, app)` record if one exists.
    pub fn evaluate(
        &self,
        user: &User,
        organization: Option<&Organization>,
        app: AppId,
        app_subscription: Option<&AppSubscription>,
        now: DateTime<Utc>,
    ) -> AccessDecision {
        if user.platform_admin {
            return AccessDecision::granted(
                app,
                "Platform admin access",
                PermissionSet::full_access(app),
                SubscriptionType::Bundle,
                now,
            );
        }

        let Some(organization) = organization.filter(|org| user.belongs_to(org.id)) else {
            return AccessDecision::denied(app, "User does not belong to an organization", now);
        };

        if organization.grandfathered {
            return AccessDecision::granted(
                app,
                "Grandfathered organization",
                role_permissions(user.role, app),
                SubscriptionType::Bundle,
                now,
            );
        }

        let Some(subscription) = resolve_subscription(organization, app, app_subscription, now)
        else {
            return AccessDecision::refused(
                app,
                AccessStatus::TrialAvailable,
                format!("No subscription for {}; a free trial is available", app.display_name()),
                now,
            );
        };

        let subscription_type = match subscription.scope {
            SubscriptionScope::Bundle => SubscriptionType::Bundle,
            SubscriptionScope::App(_) => SubscriptionType::Single,
        };

        if subscription.is_trial() {
            return match subscription.trial_days_remaining(now) {
                Some(days) => AccessDecision::granted(
                    app,
                    format!("Trial active, {days} days remaining"),
                    role_permissions(user.role, app),
                    subscription_type,
                    now,
                )
                .with_trial(subscription.trial_ends_at, Some(days)),
                None => AccessDecision::refused(
                    app,
                    AccessStatus::TrialExpired,
                    format!("The trial for {} has expired", app.display_name()),
                    now,
                )
                .with_trial(subscription.trial_ends_at, None),
            };
        }

        if subscription.is_paid_access(now) {
            let reason = match subscription.current_period_end {
                Some(end) if subscription.status == SubscriptionStatus::Cancelling => {
                    format!(
                        "Subscription cancelled; access continues until {}",
                        end.format("%Y-%m-%d")
                    )
                }
                _ => "Active subscription".to_string(),
            };
            return AccessDecision::granted(
                app,
                reason,
                role_permissions(user.role, app),
                subscription_type,
                now,
            );
        }

        AccessDecision::refused(
            app,
            AccessStatus::SubscriptionRequired,
            format!(
                "A subscription is required for {} (status: {})",
                app.display_name(),
                subscription.status
            ),
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barkeep_org::SubscriptionPlan;
    use chrono::Duration;

    fn org_and_manager() -> (Organization, User) {
        let org = Organization::new("Copper Still", "copper-still");
        let user = User::new("manager@copperstill.bar", org.id, UserRole::Manager);
        (org, user)
    }

    fn evaluate(
        user: &User,
        org: Option<&Organization>,
        app: AppId,
        record: Option<&AppSubscription>,
        now: DateTime<Utc>,
    ) -> AccessDecision {
        AccessEvaluator::new().evaluate(user, org, app, record, now)
    }

    #[test]
    fn test_platform_admin_without_organization() {
        let admin = User::platform_admin("ops@barkeep.app");
        let decision = evaluate(&admin, None, AppId::Inventory, None, Utc::now());

        assert!(decision.is_granted());
        assert_eq!(decision.subscription_type, Some(SubscriptionType::Bundle));
        for action in Action::all() {
            assert!(decision.can(action));
        }
    }

    #[test]
    fn test_platform_admin_ignores_lapsed_organization() {
        let (mut org, _) = org_and_manager();
        org.subscription_status = SubscriptionStatus::Cancelled;
        let mut admin = User::platform_admin("ops@barkeep.app");
        admin.organization_id = Some(org.id);

        let decision = evaluate(&admin, Some(&org), AppId::Consumption, None, Utc::now());
        assert!(decision.is_granted());
    }

    #[test]
    fn test_missing_organization_is_denied() {
        let (_, user) = org_and_manager();
        let decision = evaluate(&user, None, AppId::Inventory, None, Utc::now());
        assert_eq!(decision.status, AccessStatus::Denied);
    }

    #[test]
    fn test_foreign_organization_is_denied() {
        let (_, user) = org_and_manager();
        let other = Organization::new("Other", "other").grandfathered();
        let decision = evaluate(&user, Some(&other), AppId::Inventory, None, Utc::now());
        assert_eq!(decision.status, AccessStatus::Denied);
        assert!(decision.permissions.is_empty());
    }

    #[test]
    fn test_grandfathered_ignores_expired_trial() {
        let now = Utc::now();
        let (org, user) = org_and_manager();
        let mut org = org.grandfathered();
        org.start_trial(now - Duration::days(60), 30);
        org.subscription_status = SubscriptionStatus::Expired;

        for app in AppId::all() {
            let decision = evaluate(&user, Some(&org), app, None, now);
            assert!(decision.is_granted(), "{app} should be granted");
        }
    }

    #[test]
    fn test_first_access_offers_trial() {
        let (org, user) = org_and_manager();
        let decision = evaluate(&user, Some(&org), AppId::GuestManager, None, Utc::now());

        assert_eq!(decision.status, AccessStatus::TrialAvailable);
        assert!(decision.trial_days_remaining.is_none());
    }

    #[test]
    fn test_module_trial_running_and_expired() {
        let now = Utc::now();
        let (org, user) = org_and_manager();

        let mut record = AppSubscription::start_trial(org.id, AppId::Inventory, now, 14);
        record.trial_ends_at = Some(now + Duration::hours(1));
        let decision = evaluate(&user, Some(&org), AppId::Inventory, Some(&record), now);
        assert!(decision.is_granted());
        assert_eq!(decision.trial_days_remaining, Some(1));
        assert_eq!(decision.subscription_type, Some(SubscriptionType::Single));

        record.trial_ends_at = Some(now - Duration::seconds(1));
        let decision = evaluate(&user, Some(&org), AppId::Inventory, Some(&record), now);
        assert_eq!(decision.status, AccessStatus::TrialExpired);
        assert!(decision.trial_days_remaining.is_none());
        assert_eq!(decision.trial_ends_at, record.trial_ends_at);
    }

    #[test]
    fn test_organization_trial_expired() {
        let now = Utc::now();
        let (mut org, user) = org_and_manager();
        org.start_trial(now - Duration::days(30), 30);
        org.trial_ends_at = Some(now - Duration::seconds(1));

        let decision = evaluate(&user, Some(&org), AppId::Inventory, None, now);
        assert_eq!(decision.status, AccessStatus::TrialExpired);
    }

    #[test]
    fn test_paid_bundle_beats_expired_module_trial() {
        let now = Utc::now();
        let (mut org, user) = org_and_manager();
        org.change_plan(SubscriptionPlan::Professional);
        org.subscription_status = SubscriptionStatus::Active;

        let started = now - Duration::days(20);
        let mut record = AppSubscription::start_trial(org.id, AppId::Inventory, started, 14);
        record.status = SubscriptionStatus::Trial;

        let decision = evaluate(&user, Some(&org), AppId::Inventory, Some(&record), now);
        assert!(decision.is_granted());
        assert_eq!(decision.subscription_type, Some(SubscriptionType::Bundle));
    }

    #[test]
    fn test_running_org_trial_beats_expired_module_trial() {
        let now = Utc::now();
        let (mut org, user) = org_and_manager();
        let started = now - Duration::days(20);
        let record = AppSubscription::start_trial(org.id, AppId::Inventory, started, 14);
        org.start_trial(now - Duration::days(1), 30);

        let decision = evaluate(&user, Some(&org), AppId::Inventory, Some(&record), now);
        assert!(decision.is_granted(), "{}", decision.reason);
        assert_eq!(decision.subscription_type, Some(SubscriptionType::Bundle));
        assert_eq!(decision.trial_ends_at, org.trial_ends_at);
        assert_eq!(decision.trial_days_remaining, Some(29));
    }

    #[test]
    fn test_module_record_beats_expired_org_trial() {
        let now = Utc::now();
        let (mut org, user) = org_and_manager();
        org.start_trial(now - Duration::days(40), 30);
        let period_end = now + Duration::days(30);
        let record = AppSubscription::paid(org.id, AppId::Consumption, now, period_end);

        let decision = evaluate(&user, Some(&org), AppId::Consumption, Some(&record), now);
        assert!(decision.is_granted());

        let decision = evaluate(&user, Some(&org), AppId::Inventory, None, now);
        assert_eq!(decision.status, AccessStatus::TrialExpired);
    }

    #[test]
    fn test_active_starter_covers_inventory_only() {
        let now = Utc::now();
        let (mut org, user) = org_and_manager();
        org.change_plan(SubscriptionPlan::Starter);
        org.subscription_status = SubscriptionStatus::Active;
        org.current_period_end = Some(now + Duration::days(30));

        let decision = evaluate(&user, Some(&org), AppId::Inventory, None, now);
        assert!(decision.is_granted(), "{}", decision.reason);
        assert_eq!(decision.subscription_type, Some(SubscriptionType::Single));

        let decision = evaluate(&user, Some(&org), AppId::GuestManager, None, now);
        assert_eq!(decision.status, AccessStatus::TrialAvailable);
    }

    #[test]
    fn test_cancelling_within_and_after_period() {
        let now = Utc::now();
        let (org, user) = org_and_manager();
        let period_end = now + Duration::days(3);
        let mut record = AppSubscription::paid(org.id, AppId::Inventory, now, period_end);
        record.status = SubscriptionStatus::Cancelling;

        let decision = evaluate(&user, Some(&org), AppId::Inventory, Some(&record), now);
        assert!(decision.is_granted());
        assert!(decision.reason.contains("continues until"));

        let later = now + Duration::days(4);
        let decision = evaluate(&user, Some(&org), AppId::Inventory, Some(&record), later);
        assert_eq!(decision.status, AccessStatus::SubscriptionRequired);
    }

    #[test]
    fn test_lapsed_statuses_require_subscription() {
        let now = Utc::now();
        let (org, user) = org_and_manager();
        let period_end = now + Duration::days(3);

        for status in [
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Expired,
        ] {
            let mut record = AppSubscription::paid(org.id, AppId::GuestManager, now, period_end);
            record.status = status;
            let decision = evaluate(&user, Some(&org), AppId::GuestManager, Some(&record), now);
            assert_eq!(decision.status, AccessStatus::SubscriptionRequired, "{status}");
            assert!(decision.permissions.is_empty());
        }
    }

    #[test]
    fn test_record_for_other_app_is_ignored() {
        let now = Utc::now();
        let (org, user) = org_and_manager();
        let period_end = now + Duration::days(30);
        let record = AppSubscription::paid(org.id, AppId::Consumption, now, period_end);

        let decision = evaluate(&user, Some(&org), AppId::Inventory, Some(&record), now);
        assert_eq!(decision.status, AccessStatus::TrialAvailable);
    }

    #[test]
    fn test_role_shapes_permissions_not_status() {
        let now = Utc::now();
        let (org, _) = org_and_manager();
        let period_end = now + Duration::days(30);
        let record = AppSubscription::paid(org.id, AppId::Inventory, now, period_end);

        let viewer = User::new("v@copperstill.bar", org.id, UserRole::Viewer);
        let owner = User::new("o@copperstill.bar", org.id, UserRole::Owner);

        let as_viewer = evaluate(&viewer, Some(&org), AppId::Inventory, Some(&record), now);
        let as_owner = evaluate(&owner, Some(&org), AppId::Inventory, Some(&record), now);

        assert!(as_viewer.is_granted());
        assert!(as_owner.is_granted());
        assert!(!as_viewer.can(Action::Edit));
        assert!(as_owner.can(Action::Admin));
    }
}
