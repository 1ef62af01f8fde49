//! Access service
//!
//! Loads the records behind every decision from an [`AccessStore`] and runs
//! the pure checks against them. State is read fresh on every call.

use barkeep_org::{
    AppSubscription, BillingEvent, Organization, ResourceKind, StatusChange, User, UserRole,
};
use barkeep_rbac::AppId;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::AccessConfig;
use crate::decision::AccessDecision;
use crate::error::{AccessError, AccessResult};
use crate::evaluator::AccessEvaluator;
use crate::limits::{effective_limit, evaluate_limit, LimitResult};
use crate::pin;
use crate::store::{AccessStore, Reservation};
use crate::team::{authorize_invite, authorize_team_action, TeamAction};

/// Access, limit, and team-management operations over a store.
///
/// # Examples
///
/// ```
/// use barkeep_access::{AccessConfig, AccessService, AccessStatus, AccessStore, MemoryStore};
/// use barkeep_org::{Organization, User, UserRole};
/// use barkeep_rbac::AppId;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = Arc::new(MemoryStore::new());
/// let service = AccessService::new(store.clone(), AccessConfig::default());
///
/// let org = Organization::new("Corner Bar", "corner-bar");
/// let owner = User::new("owner@corner.bar", org.id, UserRole::Owner);
/// store.save_organization(&org).await.unwrap();
/// store.insert_user(owner.clone()).await;
///
/// let decision = service.check_access(owner.id, AppId::Inventory).await.unwrap();
/// assert_eq!(decision.status, AccessStatus::TrialAvailable);
///
/// service.start_app_trial(owner.id, AppId::Inventory).await.unwrap();
/// let decision = service.check_access(owner.id, AppId::Inventory).await.unwrap();
/// assert!(decision.is_granted());
/// # }
/// ```
pub struct AccessService<S: AccessStore> {
    store: Arc<S>,
    config: AccessConfig,
    evaluator: AccessEvaluator,
}

impl<S: AccessStore> Clone for AccessService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            evaluator: self.evaluator,
        }
    }
}

impl<S: AccessStore> AccessService<S> {
    /// Create a service over `store`.
    pub fn new(store: Arc<S>, config: AccessConfig) -> Self {
        Self {
            store,
            config,
            evaluator: AccessEvaluator::new(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Active configuration.
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Module access
    // ---------------------------------------------------------------------

    /// Decide whether `user_id` may enter `app`.
    ///
    /// An unknown user is [`AccessError::NotAuthenticated`]. A user whose
    /// organization is missing gets a `denied` decision. Store failures are
    /// returned as errors, never as a grant.
    #[instrument(skip(self), fields(app = %app))]
    pub async fn check_access(&self, user_id: Uuid, app: AppId) -> AccessResult<AccessDecision> {
        self.evaluate(user_id, app)
            .await
            .inspect_err(|e| log_failure("check_access", e))
    }

    /// Like [`check_access`](Self::check_access), but any error becomes a
    /// `denied` decision.
    pub async fn check_access_or_deny(&self, user_id: Uuid, app: AppId) -> AccessDecision {
        match self.check_access(user_id, app).await {
            Ok(decision) => decision,
            Err(e) => {
                let reason = if e.is_server_error() {
                    "Access could not be verified".to_string()
                } else {
                    e.to_string()
                };
                AccessDecision::denied(app, reason, Utc::now())
            }
        }
    }

    async fn evaluate(&self, user_id: Uuid, app: AppId) -> AccessResult<AccessDecision> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AccessError::NotAuthenticated)?;

        let organization = match user.organization_id {
            Some(org_id) if !user.platform_admin => self.store.get_organization(org_id).await?,
            _ => None,
        };

        let app_subscription = match &organization {
            Some(org) if !org.grandfathered => {
                self.store.get_app_subscription(org.id, app).await?
            }
            _ => None,
        };

        let decision = self.evaluator.evaluate(
            &user,
            organization.as_ref(),
            app,
            app_subscription.as_ref(),
            Utc::now(),
        );

        debug!(
            user_id = %user.id,
            organization_id = ?user.organization_id,
            status = %decision.status,
            reason = %decision.reason,
            "Access evaluated"
        );

        Ok(decision)
    }

    // ---------------------------------------------------------------------
    // Trials
    // ---------------------------------------------------------------------

    /// Start a trial of `app` for the acting user's organization.
    ///
    /// Requires a manager or owner. Each `(organization, app)` pair gets one
    /// trial; a second start is [`AccessError::TrialAlreadyStarted`].
    #[instrument(skip(self), fields(app = %app))]
    pub async fn start_app_trial(
        &self,
        actor_id: Uuid,
        app: AppId,
    ) -> AccessResult<AppSubscription> {
        async {
            let actor = self.load_actor(actor_id).await?;
            let organization = self.load_actor_organization(&actor).await?;
            require_trial_starter(&actor)?;

            let record = AppSubscription::start_trial(
                organization.id,
                app,
                Utc::now(),
                self.config.app_trial_days,
            );

            if !self.store.insert_app_subscription(&record).await? {
                return Err(AccessError::TrialAlreadyStarted(app.display_name().to_string()));
            }

            info!(
                organization_id = %organization.id,
                actor_id = %actor.id,
                trial_ends_at = ?record.trial_ends_at,
                "Module trial started"
            );
            Ok(record)
        }
        .await
        .inspect_err(|e| log_failure("start_app_trial", e))
    }

    /// Start the organization-wide trial covering every module.
    ///
    /// Rejected once the organization has had a trial or moved past it.
    #[instrument(skip(self))]
    pub async fn start_organization_trial(&self, actor_id: Uuid) -> AccessResult<Organization> {
        async {
            let actor = self.load_actor(actor_id).await?;
            let mut organization = self.load_actor_organization(&actor).await?;
            require_trial_starter(&actor)?;

            if organization.has_started_subscription() {
                return Err(AccessError::TrialAlreadyStarted(organization.name.clone()));
            }

            organization.start_trial(Utc::now(), self.config.organization_trial_days);
            self.store.save_organization(&organization).await?;

            info!(
                organization_id = %organization.id,
                actor_id = %actor.id,
                trial_ends_at = ?organization.trial_ends_at,
                "Organization trial started"
            );
            Ok(organization)
        }
        .await
        .inspect_err(|e| log_failure("start_organization_trial", e))
    }

    // ---------------------------------------------------------------------
    // Usage limits
    // ---------------------------------------------------------------------

    /// Check whether the organization may add one more `kind`.
    #[instrument(skip(self), fields(resource = %kind))]
    pub async fn check_limit(
        &self,
        organization_id: Uuid,
        kind: ResourceKind,
    ) -> AccessResult<LimitResult> {
        async {
            let organization = self.load_organization(organization_id).await?;
            let current = self.store.count_resources(organization_id, kind).await?;
            let result = evaluate_limit(&organization, kind, current);

            debug!(
                organization_id = %organization_id,
                current = result.current,
                limit = result.limit,
                allowed = result.allowed,
                "Limit checked"
            );
            Ok(result)
        }
        .await
        .inspect_err(|e| log_failure("check_limit", e))
    }

    /// Count one more item or storage area against the plan limit.
    ///
    /// Returns the new count, or [`AccessError::LimitReached`] when the
    /// organization is full. Members are added with
    /// [`invite_member`](Self::invite_member); passing
    /// [`ResourceKind::Users`] is [`AccessError::UnsupportedResource`].
    #[instrument(skip(self), fields(resource = %kind))]
    pub async fn reserve_resource(
        &self,
        organization_id: Uuid,
        kind: ResourceKind,
    ) -> AccessResult<u64> {
        async {
            require_counted_resource(kind)?;
            let organization = self.load_organization(organization_id).await?;
            let limit = effective_limit(&organization, kind);

            match self.store.reserve_resource(organization_id, kind, limit).await? {
                Reservation::Accepted { count } => Ok(count),
                Reservation::Rejected { current } => Err(AccessError::LimitReached {
                    resource: kind,
                    current,
                    limit: limit.unwrap_or_default(),
                }),
            }
        }
        .await
        .inspect_err(|e| log_failure("reserve_resource", e))
    }

    /// Give back an item or storage area. Returns the new count.
    pub async fn release_resource(
        &self,
        organization_id: Uuid,
        kind: ResourceKind,
    ) -> AccessResult<u64> {
        async {
            require_counted_resource(kind)?;
            Ok(self.store.release_resource(organization_id, kind).await?)
        }
        .await
        .inspect_err(|e| log_failure("release_resource", e))
    }

    // ---------------------------------------------------------------------
    // Team management
    // ---------------------------------------------------------------------

    /// Add a member to the acting user's organization.
    ///
    /// The role check runs first, then the users limit, which is enforced
    /// by the store in the same write as the insert.
    #[instrument(skip(self, email), fields(role = %role))]
    pub async fn invite_member(
        &self,
        actor_id: Uuid,
        email: impl Into<String> + Send,
        role: UserRole,
    ) -> AccessResult<User> {
        let email = email.into();
        async {
            let actor = self.load_actor(actor_id).await?;
            authorize_invite(&actor, role)?;
            let organization = self.load_actor_organization(&actor).await?;

            let member = User::new(email, organization.id, role);
            let limit = effective_limit(&organization, ResourceKind::Users);

            match self.store.insert_user_within_limit(&member, limit).await? {
                Reservation::Accepted { count } => {
                    info!(
                        organization_id = %organization.id,
                        actor_id = %actor.id,
                        user_id = %member.id,
                        members = count,
                        "Member invited"
                    );
                    Ok(member)
                }
                Reservation::Rejected { current } => Err(AccessError::LimitReached {
                    resource: ResourceKind::Users,
                    current,
                    limit: limit.unwrap_or_default(),
                }),
            }
        }
        .await
        .inspect_err(|e| log_failure("invite_member", e))
    }

    /// Give a member a new role.
    #[instrument(skip(self), fields(role = %new_role))]
    pub async fn change_role(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        new_role: UserRole,
    ) -> AccessResult<User> {
        async {
            let (actor, mut target) = self
                .authorize(actor_id, target_id, &TeamAction::ChangeRole { new_role })
                .await?;

            let previous = target.role;
            target.set_role(new_role);
            self.store.save_user(&target).await?;

            info!(
                organization_id = ?target.organization_id,
                actor_id = %actor.id,
                user_id = %target.id,
                from = %previous,
                to = %new_role,
                "Member role changed"
            );
            Ok(target)
        }
        .await
        .inspect_err(|e| log_failure("change_role", e))
    }

    /// Remove a member from the organization.
    ///
    /// The account is anonymized and detached rather than deleted. Returns
    /// the anonymized record.
    #[instrument(skip(self))]
    pub async fn remove_member(&self, actor_id: Uuid, target_id: Uuid) -> AccessResult<User> {
        async {
            let (actor, mut target) = self
                .authorize(actor_id, target_id, &TeamAction::Remove)
                .await?;

            let organization_id = target.organization_id;
            target.anonymize();
            self.store.save_user(&target).await?;

            info!(
                organization_id = ?organization_id,
                actor_id = %actor.id,
                user_id = %target.id,
                "Member removed"
            );
            Ok(target)
        }
        .await
        .inspect_err(|e| log_failure("remove_member", e))
    }

    /// Set a member's quick-login PIN.
    #[instrument(skip(self, pin))]
    pub async fn update_pin(&self, actor_id: Uuid, target_id: Uuid, pin: &str) -> AccessResult<()> {
        async {
            let (actor, mut target) = self
                .authorize(actor_id, target_id, &TeamAction::UpdatePin)
                .await?;

            target.set_pin_hash(pin::hash_pin(pin, &self.config)?);
            self.store.save_user(&target).await?;

            info!(actor_id = %actor.id, user_id = %target.id, "PIN updated");
            Ok(())
        }
        .await
        .inspect_err(|e| log_failure("update_pin", e))
    }

    /// Check a member's PIN. A member without a PIN never matches.
    pub async fn verify_pin(&self, user_id: Uuid, pin: &str) -> AccessResult<bool> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AccessError::UserNotFound(user_id))?;

        let matched = user
            .pin_hash
            .as_deref()
            .is_some_and(|stored| pin::verify_pin(pin, stored));

        if !matched {
            debug!(user_id = %user_id, "PIN mismatch");
        }
        Ok(matched)
    }

    async fn authorize(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        action: &TeamAction,
    ) -> AccessResult<(User, User)> {
        let actor = self.load_actor(actor_id).await?;
        let target = self
            .store
            .get_user(target_id)
            .await?
            .ok_or(AccessError::UserNotFound(target_id))?;

        authorize_team_action(&actor, &target, action)?;
        Ok((actor, target))
    }

    // ---------------------------------------------------------------------
    // Billing
    // ---------------------------------------------------------------------

    /// Apply a billing provider event.
    ///
    /// With `app = None` the organization-wide subscription is updated;
    /// otherwise the `(organization, app)` record. A completed checkout for
    /// a module without a record creates one.
    #[instrument(skip(self, event), fields(event = event.name()))]
    pub async fn apply_billing_event(
        &self,
        organization_id: Uuid,
        app: Option<AppId>,
        event: &BillingEvent,
    ) -> AccessResult<StatusChange> {
        async {
            let now = Utc::now();

            let change = match app {
                None => {
                    let mut organization = self.load_organization(organization_id).await?;
                    let change = barkeep_org::apply_billing_event(&mut organization, event, now);
                    self.store.save_organization(&organization).await?;
                    change
                }
                Some(app) => {
                    let existing = self.store.get_app_subscription(organization_id, app).await?;
                    match (existing, event) {
                        (Some(mut record), _) => {
                            let change = barkeep_org::apply_billing_event(&mut record, event, now);
                            self.store.save_app_subscription(&record).await?;
                            change
                        }
                        (None, BillingEvent::CheckoutCompleted { period_end, .. }) => {
                            let record =
                                AppSubscription::paid(organization_id, app, now, *period_end);
                            if !self.store.insert_app_subscription(&record).await? {
                                return Err(AccessError::EvaluationFailed(format!(
                                    "subscription record for {app} changed concurrently"
                                )));
                            }
                            StatusChange {
                                from: record.status,
                                to: record.status,
                            }
                        }
                        (None, _) => {
                            warn!(
                                organization_id = %organization_id,
                                app = %app,
                                "Billing event for a module without a subscription record"
                            );
                            return Err(AccessError::EvaluationFailed(format!(
                                "no subscription record for {app}"
                            )));
                        }
                    }
                }
            };

            info!(
                organization_id = %organization_id,
                app = ?app,
                from = %change.from,
                to = %change.to,
                "Billing event applied"
            );
            Ok(change)
        }
        .await
        .inspect_err(|e| log_failure("apply_billing_event", e))
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    async fn load_actor(&self, actor_id: Uuid) -> AccessResult<User> {
        self.store
            .get_user(actor_id)
            .await?
            .ok_or(AccessError::NotAuthenticated)
    }

    async fn load_organization(&self, organization_id: Uuid) -> AccessResult<Organization> {
        self.store
            .get_organization(organization_id)
            .await?
            .ok_or(AccessError::OrganizationNotFound)
    }

    async fn load_actor_organization(&self, actor: &User) -> AccessResult<Organization> {
        let organization_id = actor.organization_id.ok_or(AccessError::OrganizationNotFound)?;
        self.load_organization(organization_id).await
    }
}

fn require_trial_starter(actor: &User) -> AccessResult<()> {
    if actor.role.can_manage_team() {
        return Ok(());
    }
    Err(AccessError::InsufficientRole(
        "only owners and managers can start a trial".to_string(),
    ))
}

fn require_counted_resource(kind: ResourceKind) -> AccessResult<()> {
    match kind {
        ResourceKind::Users => Err(AccessError::UnsupportedResource(kind)),
        _ => Ok(()),
    }
}

fn log_failure(operation: &str, err: &AccessError) {
    if err.is_server_error() {
        error!(operation, error = %err, "Access operation failed");
    } else {
        warn!(operation, code = err.error_code(), error = %err, "Access operation rejected");
    }
}
