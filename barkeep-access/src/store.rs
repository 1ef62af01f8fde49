//! Persistence boundary
//!
//! The access layer reads users, organizations and subscription records
//! through [`AccessStore`]. Every call reads current state; nothing is
//! cached between evaluations.
//!
//! Additions that are capped by a plan limit go through a single
//! conditional write ([`AccessStore::insert_user_within_limit`],
//! [`AccessStore::reserve_resource`]) so two concurrent requests cannot
//! both pass the check. A SQL backend implements these as one
//! `INSERT ... SELECT ... WHERE (SELECT count(*) ...) < $limit` statement.

use async_trait::async_trait;
use barkeep_org::{AppSubscription, Organization, ResourceKind, User};
use barkeep_rbac::AppId;
use thiserror::Error;
use uuid::Uuid;

/// Storage error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure (connection, query, timeout)
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Record to update does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Stored data could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a limit-guarded insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The insert happened; `count` includes the new record.
    Accepted {
        /// Count after the insert
        count: u64,
    },
    /// The limit was already reached; nothing was written.
    Rejected {
        /// Count at the time of the check
        current: u64,
    },
}

/// Persistence operations used by the access layer.
#[async_trait]
pub trait AccessStore: Send + Sync {
    /// Load a user.
    async fn get_user(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    /// Persist changes to an existing user.
    async fn save_user(&self, user: &User) -> StoreResult<()>;

    /// Load an organization.
    async fn get_organization(&self, organization_id: Uuid) -> StoreResult<Option<Organization>>;

    /// Persist an organization (insert or update).
    async fn save_organization(&self, organization: &Organization) -> StoreResult<()>;

    /// Load the `(organization, app)` subscription record.
    async fn get_app_subscription(
        &self,
        organization_id: Uuid,
        app: AppId,
    ) -> StoreResult<Option<AppSubscription>>;

    /// Insert a subscription record unless one exists for the same
    /// `(organization, app)`. Returns `false` when nothing was written.
    async fn insert_app_subscription(&self, record: &AppSubscription) -> StoreResult<bool>;

    /// Persist changes to an existing subscription record.
    async fn save_app_subscription(&self, record: &AppSubscription) -> StoreResult<()>;

    /// Count an organization's resources of one kind.
    async fn count_resources(&self, organization_id: Uuid, kind: ResourceKind) -> StoreResult<u64>;

    /// Insert a user into their organization if it has fewer than `limit`
    /// members (`None` = unlimited), atomically.
    async fn insert_user_within_limit(
        &self,
        user: &User,
        limit: Option<u32>,
    ) -> StoreResult<Reservation>;

    /// Count one more resource of `kind` if the organization has fewer
    /// than `limit` (`None` = unlimited), atomically.
    async fn reserve_resource(
        &self,
        organization_id: Uuid,
        kind: ResourceKind,
        limit: Option<u32>,
    ) -> StoreResult<Reservation>;

    /// Give back one resource of `kind`. Returns the new count.
    async fn release_resource(&self, organization_id: Uuid, kind: ResourceKind) -> StoreResult<u64>;
}
