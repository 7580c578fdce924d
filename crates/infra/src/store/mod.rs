//! Boundary to the hosted relational backend.
//!
//! Parts and movements are read-only from SpareKeep's side; requisitions,
//! notifications, service scopes and profile status are written back. No storage assumptions
//! leak past this trait.

pub mod demo;
pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use sparekeep_auth::{AccountStatus, StoredProfile};
use sparekeep_core::{ExpectedVersion, NotificationId, PartId, RequisitionId, UserId};
use sparekeep_inventory::{Movement, Part};
use sparekeep_requisitions::{Notification, RequisitionCategory, RequisitionSnapshot, ServiceScope};

pub use in_memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

/// Store operation error.
///
/// Infrastructure failures only; business rule violations are `DomainError`s.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("record not found")]
    NotFound,

    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PartStore: Send + Sync {
    /// Current catalog snapshot, in store order.
    async fn fetch_parts(&self) -> StoreResult<Vec<Part>>;

    async fn fetch_part(&self, id: PartId) -> StoreResult<Option<Part>>;

    async fn fetch_movements(&self, part_id: PartId) -> StoreResult<Vec<Movement>>;

    async fn fetch_profile(&self, id: UserId) -> StoreResult<Option<StoredProfile>>;

    async fn list_profiles(&self) -> StoreResult<Vec<StoredProfile>>;

    /// Activate or deactivate an account. A missing profile is not found.
    async fn set_profile_status(&self, id: UserId, status: AccountStatus) -> StoreResult<()>;

    /// Requisitions newest first, optionally restricted to one category.
    async fn list_requisitions(
        &self,
        category: Option<RequisitionCategory>,
    ) -> StoreResult<Vec<RequisitionSnapshot>>;

    async fn load_requisition(&self, id: RequisitionId) -> StoreResult<Option<RequisitionSnapshot>>;

    /// Insert or replace a requisition. `expected` is checked against the
    /// stored version (0 when absent).
    async fn save_requisition(
        &self,
        snapshot: RequisitionSnapshot,
        expected: ExpectedVersion,
    ) -> StoreResult<()>;

    async fn insert_notification(&self, notification: Notification) -> StoreResult<()>;

    /// Notifications for `user_id`, newest first.
    async fn list_notifications(&self, user_id: UserId) -> StoreResult<Vec<Notification>>;

    /// Mark one of `user_id`'s notifications as read. Someone else's
    /// notification is reported as not found.
    async fn mark_notification_read(&self, user_id: UserId, id: NotificationId) -> StoreResult<()>;

    async fn insert_service_scope(&self, scope: ServiceScope) -> StoreResult<()>;

    /// Service scopes, newest first.
    async fn list_service_scopes(&self) -> StoreResult<Vec<ServiceScope>>;
}
