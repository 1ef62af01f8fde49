//! Access decisions
//!
//! The outcome of evaluating whether a user may enter a module.

use barkeep_rbac::{Action, AppId, Permission, PermissionSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of an access evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AccessStatus {
    /// The user may enter the module
    Granted,

    /// No subscription record yet; a trial can be started
    TrialAvailable,

    /// The trial ran out
    TrialExpired,

    /// A paid subscription is needed (lapsed, failed, or cancelled)
    SubscriptionRequired,

    /// Access refused for a reason unrelated to billing
    Denied,
}

impl AccessStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessStatus::Granted => "granted",
            AccessStatus::TrialAvailable => "trial-available",
            AccessStatus::TrialExpired => "trial-expired",
            AccessStatus::SubscriptionRequired => "subscription-required",
            AccessStatus::Denied => "denied",
        }
    }
}

impl std::fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of subscription produced a grant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionType {
    /// Organization-wide subscription covering every module
    Bundle,
    /// Single-module subscription
    Single,
}

/// Result of an access evaluation for one module.
///
/// `trial_days_remaining` is only set while a trial is running, so an
/// expired trial (`None`) can be told apart from a running one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Module that was requested
    pub app: AppId,

    /// Outcome
    pub status: AccessStatus,

    /// Human-readable explanation
    pub reason: String,

    /// What the user may do inside the module (empty unless granted)
    pub permissions: PermissionSet,

    /// Subscription that produced the grant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<SubscriptionType>,

    /// Whole days left in a running trial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_days_remaining: Option<i64>,

    /// End of the trial behind this decision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<DateTime<Utc>>,

    /// When the decision was made
    pub evaluated_at: DateTime<Utc>,
}

impl AccessDecision {
    /// A grant with the given permissions.
    pub fn granted(
        app: AppId,
        reason: impl Into<String>,
        permissions: PermissionSet,
        subscription_type: SubscriptionType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            app,
            status: AccessStatus::Granted,
            reason: reason.into(),
            permissions,
            subscription_type: Some(subscription_type),
            trial_days_remaining: None,
            trial_ends_at: None,
            evaluated_at: now,
        }
    }

    /// A non-granting decision.
    pub fn refused(
        app: AppId,
        status: AccessStatus,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            app,
            status,
            reason: reason.into(),
            permissions: PermissionSet::new(),
            subscription_type: None,
            trial_days_remaining: None,
            trial_ends_at: None,
            evaluated_at: now,
        }
    }

    /// A `denied` decision.
    pub fn denied(app: AppId, reason: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::refused(app, AccessStatus::Denied, reason, now)
    }

    /// Attach trial information.
    pub fn with_trial(
        mut self,
        ends_at: Option<DateTime<Utc>>,
        days_remaining: Option<i64>,
    ) -> Self {
        self.trial_ends_at = ends_at;
        self.trial_days_remaining = days_remaining;
        self
    }

    /// Whether the user may enter the module.
    pub fn is_granted(&self) -> bool {
        self.status == AccessStatus::Granted
    }

    /// Whether the user may perform an action inside the module.
    pub fn can(&self, action: Action) -> bool {
        self.is_granted() && self.permissions.has(&Permission::new(self.app, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&AccessStatus::SubscriptionRequired).unwrap();
        assert_eq!(json, "\"subscription-required\"");
        assert_eq!(AccessStatus::TrialAvailable.to_string(), "trial-available");
    }

    #[test]
    fn test_refused_has_no_permissions() {
        let decision = AccessDecision::denied(AppId::Inventory, "nope", Utc::now());
        assert!(!decision.is_granted());
        assert!(decision.permissions.is_empty());
        assert!(!decision.can(Action::View));
    }

    #[test]
    fn test_can_uses_implications() {
        let decision = AccessDecision::granted(
            AppId::GuestManager,
            "ok",
            PermissionSet::for_actions(AppId::GuestManager, &[Action::Edit]),
            SubscriptionType::Single,
            Utc::now(),
        );
        assert!(decision.can(Action::View));
        assert!(decision.can(Action::Edit));
        assert!(!decision.can(Action::Delete));
    }

    #[test]
    fn test_expired_trial_omits_days_remaining() {
        let decision = AccessDecision::refused(
            AppId::Inventory,
            AccessStatus::TrialExpired,
            "expired",
            Utc::now(),
        );
        let json = serde_json::to_value(&decision).unwrap();
        assert!(json.get("trial_days_remaining").is_none());
        assert_eq!(json["status"], "trial-expired");
    }
}
