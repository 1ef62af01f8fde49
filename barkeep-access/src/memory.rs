//! In-memory store
//!
//! Suitable for single-process deployments and tests. All state sits
//! behind one `RwLock`, so every limit-guarded insert is a single critical
//! section.

use async_trait::async_trait;
use barkeep_org::{AppSubscription, Organization, ResourceKind, User};
use barkeep_rbac::AppId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{AccessStore, Reservation, StoreError, StoreResult};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    organizations: HashMap<Uuid, Organization>,
    app_subscriptions: HashMap<(Uuid, AppId), AppSubscription>,
    resource_counts: HashMap<(Uuid, ResourceKind), u64>,
}

impl MemoryState {
    fn member_count(&self, organization_id: Uuid) -> u64 {
        self.users
            .values()
            .filter(|u| u.belongs_to(organization_id))
            .count() as u64
    }

    fn count(&self, organization_id: Uuid, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Users => self.member_count(organization_id),
            _ => self
                .resource_counts
                .get(&(organization_id, kind))
                .copied()
                .unwrap_or(0),
        }
    }
}

/// In-memory [`AccessStore`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
    unavailable: Arc<AtomicBool>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("unavailable", &self.unavailable.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user without any limit check (seeding, imports).
    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Overwrite the stored count for an item-like resource.
    pub async fn set_resource_count(&self, organization_id: Uuid, kind: ResourceKind, count: u64) {
        self.state
            .write()
            .await
            .resource_counts
            .insert((organization_id, kind), count);
    }

    /// Make every call fail with a backend error, simulating an outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Backend("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AccessStore for MemoryStore {
    async fn get_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        self.check_available()?;
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        self.check_available()?;
        let mut state = self.state.write().await;
        match state.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("user {}", user.id))),
        }
    }

    async fn get_organization(&self, organization_id: Uuid) -> StoreResult<Option<Organization>> {
        self.check_available()?;
        Ok(self
            .state
            .read()
            .await
            .organizations
            .get(&organization_id)
            .cloned())
    }

    async fn save_organization(&self, organization: &Organization) -> StoreResult<()> {
        self.check_available()?;
        self.state
            .write()
            .await
            .organizations
            .insert(organization.id, organization.clone());
        Ok(())
    }

    async fn get_app_subscription(
        &self,
        organization_id: Uuid,
        app: AppId,
    ) -> StoreResult<Option<AppSubscription>> {
        self.check_available()?;
        Ok(self
            .state
            .read()
            .await
            .app_subscriptions
            .get(&(organization_id, app))
            .cloned())
    }

    async fn insert_app_subscription(&self, record: &AppSubscription) -> StoreResult<bool> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let key = (record.organization_id, record.app_id);
        if state.app_subscriptions.contains_key(&key) {
            return Ok(false);
        }
        state.app_subscriptions.insert(key, record.clone());
        Ok(true)
    }

    async fn save_app_subscription(&self, record: &AppSubscription) -> StoreResult<()> {
        self.check_available()?;
        let mut state = self.state.write().await;
        match state
            .app_subscriptions
            .get_mut(&(record.organization_id, record.app_id))
        {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!(
                "subscription {}/{}",
                record.organization_id, record.app_id
            ))),
        }
    }

    async fn count_resources(&self, organization_id: Uuid, kind: ResourceKind) -> StoreResult<u64> {
        self.check_available()?;
        Ok(self.state.read().await.count(organization_id, kind))
    }

    async fn insert_user_within_limit(
        &self,
        user: &User,
        limit: Option<u32>,
    ) -> StoreResult<Reservation> {
        self.check_available()?;
        let organization_id = user
            .organization_id
            .ok_or_else(|| StoreError::NotFound(format!("organization for user {}", user.id)))?;

        let mut state = self.state.write().await;
        let current = state.member_count(organization_id);
        if limit.is_some_and(|limit| current >= u64::from(limit)) {
            return Ok(Reservation::Rejected { current });
        }

        state.users.insert(user.id, user.clone());
        Ok(Reservation::Accepted { count: current + 1 })
    }

    async fn reserve_resource(
        &self,
        organization_id: Uuid,
        kind: ResourceKind,
        limit: Option<u32>,
    ) -> StoreResult<Reservation> {
        self.check_available()?;
        if kind == ResourceKind::Users {
            return Err(StoreError::Backend(
                "members are added through insert_user_within_limit".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        let count = state.resource_counts.entry((organization_id, kind)).or_insert(0);
        if limit.is_some_and(|limit| *count >= u64::from(limit)) {
            return Ok(Reservation::Rejected { current: *count });
        }

        *count += 1;
        Ok(Reservation::Accepted { count: *count })
    }

    async fn release_resource(
        &self,
        organization_id: Uuid,
        kind: ResourceKind,
    ) -> StoreResult<u64> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let count = state.resource_counts.entry((organization_id, kind)).or_insert(0);
        *count = count.saturating_sub(1);
        Ok(*count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barkeep_org::UserRole;
    use chrono::Utc;

    #[tokio::test]
    async fn test_app_subscription_insert_is_once_only() {
        let store = MemoryStore::new();
        let org_id = Uuid::now_v7();
        let record = AppSubscription::start_trial(org_id, AppId::Inventory, Utc::now(), 14);

        assert!(store.insert_app_subscription(&record).await.unwrap());
        assert!(!store.insert_app_subscription(&record).await.unwrap());
        assert!(store
            .get_app_subscription(org_id, AppId::Inventory)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_insert_user_within_limit() {
        let store = MemoryStore::new();
        let org_id = Uuid::now_v7();

        let first = User::new("a@bar.test", org_id, UserRole::Owner);
        let second = User::new("b@bar.test", org_id, UserRole::Staff);

        assert_eq!(
            store.insert_user_within_limit(&first, Some(1)).await.unwrap(),
            Reservation::Accepted { count: 1 }
        );
        assert_eq!(
            store.insert_user_within_limit(&second, Some(1)).await.unwrap(),
            Reservation::Rejected { current: 1 }
        );
        assert_eq!(
            store.insert_user_within_limit(&second, None).await.unwrap(),
            Reservation::Accepted { count: 2 }
        );
        assert_eq!(store.count_resources(org_id, ResourceKind::Users).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reserve_and_release() {
        let store = MemoryStore::new();
        let org_id = Uuid::now_v7();

        for _ in 0..2 {
            store
                .reserve_resource(org_id, ResourceKind::StorageAreas, Some(2))
                .await
                .unwrap();
        }
        assert_eq!(
            store
                .reserve_resource(org_id, ResourceKind::StorageAreas, Some(2))
                .await
                .unwrap(),
            Reservation::Rejected { current: 2 }
        );

        assert_eq!(
            store.release_resource(org_id, ResourceKind::StorageAreas).await.unwrap(),
            1
        );
        assert!(store
            .reserve_resource(org_id, ResourceKind::Users, None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.get_user(Uuid::now_v7()).await,
            Err(StoreError::Backend(_))
        ));

        store.set_unavailable(false);
        assert!(store.get_user(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_user_requires_existing() {
        let store = MemoryStore::new();
        let user = User::new("x@bar.test", Uuid::now_v7(), UserRole::Staff);
        assert!(matches!(
            store.save_user(&user).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
