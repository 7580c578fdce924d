use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use sparekeep_auth::{AccountStatus, StoredProfile};
use sparekeep_core::{ExpectedVersion, NotificationId, PartId, RequisitionId, UserId};
use sparekeep_inventory::{Movement, Part, history_for};
use sparekeep_requisitions::{Notification, RequisitionCategory, RequisitionSnapshot, ServiceScope};

use super::demo::{demo_movements, demo_parts};
use super::{PartStore, StoreError, StoreResult};

/// In-memory store for tests/dev.
///
/// `set_available(false)` makes every call fail with
/// [`StoreError::Unavailable`], standing in for a backend outage.
#[derive(Debug)]
pub struct InMemoryStore {
    parts: RwLock<Vec<Part>>,
    movements: RwLock<Vec<Movement>>,
    profiles: RwLock<HashMap<UserId, StoredProfile>>,
    requisitions: RwLock<HashMap<RequisitionId, RequisitionSnapshot>>,
    notifications: RwLock<Vec<Notification>>,
    scopes: RwLock<Vec<ServiceScope>>,
    available: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            parts: RwLock::new(Vec::new()),
            movements: RwLock::new(Vec::new()),
            profiles: RwLock::new(HashMap::new()),
            requisitions: RwLock::new(HashMap::new()),
            notifications: RwLock::new(Vec::new()),
            scopes: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Store pre-loaded with the demo catalog and movement history.
    pub fn seeded() -> Self {
        let store = Self::new();
        if let Ok(mut parts) = store.parts.write() {
            *parts = demo_parts();
        }
        if let Ok(mut movements) = store.movements.write() {
            *movements = demo_movements();
        }
        store
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Insert or replace a part, keeping its position when it already exists.
    pub fn upsert_part(&self, part: Part) {
        if let Ok(mut parts) = self.parts.write() {
            match parts.iter_mut().find(|p| p.id == part.id) {
                Some(existing) => *existing = part,
                None => parts.push(part),
            }
        }
    }

    pub fn insert_movement(&self, movement: Movement) {
        if let Ok(mut movements) = self.movements.write() {
            movements.push(movement);
        }
    }

    pub fn upsert_profile(&self, profile: StoredProfile) {
        if let Ok(mut profiles) = self.profiles.write() {
            profiles.insert(profile.id, profile);
        }
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store is offline".to_string()))
        }
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait]
impl PartStore for InMemoryStore {
    async fn fetch_parts(&self) -> StoreResult<Vec<Part>> {
        self.ensure_available()?;
        Ok(self.parts.read().map_err(poisoned)?.clone())
    }

    async fn fetch_part(&self, id: PartId) -> StoreResult<Option<Part>> {
        self.ensure_available()?;
        let parts = self.parts.read().map_err(poisoned)?;
        Ok(parts.iter().find(|p| p.id == id).cloned())
    }

    async fn fetch_movements(&self, part_id: PartId) -> StoreResult<Vec<Movement>> {
        self.ensure_available()?;
        let movements = self.movements.read().map_err(poisoned)?;
        Ok(history_for(part_id, movements.iter()))
    }

    async fn fetch_profile(&self, id: UserId) -> StoreResult<Option<StoredProfile>> {
        self.ensure_available()?;
        Ok(self.profiles.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn list_profiles(&self) -> StoreResult<Vec<StoredProfile>> {
        self.ensure_available()?;
        let mut profiles: Vec<_> = self.profiles.read().map_err(poisoned)?.values().cloned().collect();
        profiles.sort_by_key(|p| p.id);
        Ok(profiles)
    }

    async fn set_profile_status(&self, id: UserId, status: AccountStatus) -> StoreResult<()> {
        self.ensure_available()?;
        let mut profiles = self.profiles.write().map_err(poisoned)?;
        let profile = profiles.get_mut(&id).ok_or(StoreError::NotFound)?;
        profile.status = Some(status.as_str().to_string());
        Ok(())
    }

    async fn list_requisitions(
        &self,
        category: Option<RequisitionCategory>,
    ) -> StoreResult<Vec<RequisitionSnapshot>> {
        self.ensure_available()?;
        let map = self.requisitions.read().map_err(poisoned)?;
        let mut out: Vec<_> = map
            .values()
            .filter(|r| category.is_none_or(|c| r.category() == c))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn load_requisition(&self, id: RequisitionId) -> StoreResult<Option<RequisitionSnapshot>> {
        self.ensure_available()?;
        Ok(self.requisitions.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn save_requisition(
        &self,
        snapshot: RequisitionSnapshot,
        expected: ExpectedVersion,
    ) -> StoreResult<()> {
        self.ensure_available()?;
        let mut map = self.requisitions.write().map_err(poisoned)?;

        let current = map.get(&snapshot.id).map(|s| s.version).unwrap_or(0);
        expected
            .check(current)
            .map_err(|e| StoreError::Conflict(e.to_string()))?;

        map.insert(snapshot.id, snapshot);
        Ok(())
    }

    async fn insert_notification(&self, notification: Notification) -> StoreResult<()> {
        self.ensure_available()?;
        self.notifications.write().map_err(poisoned)?.push(notification);
        Ok(())
    }

    async fn list_notifications(&self, user_id: UserId) -> StoreResult<Vec<Notification>> {
        self.ensure_available()?;
        let all = self.notifications.read().map_err(poisoned)?;
        let mut mine: Vec<_> = all.iter().filter(|n| n.user_id == user_id).cloned().collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn mark_notification_read(&self, user_id: UserId, id: NotificationId) -> StoreResult<()> {
        self.ensure_available()?;
        let mut all = self.notifications.write().map_err(poisoned)?;
        let n = all
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        n.read = true;
        Ok(())
    }

    async fn insert_service_scope(&self, scope: ServiceScope) -> StoreResult<()> {
        self.ensure_available()?;
        self.scopes.write().map_err(poisoned)?.push(scope);
        Ok(())
    }

    async fn list_service_scopes(&self) -> StoreResult<Vec<ServiceScope>> {
        self.ensure_available()?;
        let mut scopes = self.scopes.read().map_err(poisoned)?.clone();
        scopes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(scopes)
    }
}
