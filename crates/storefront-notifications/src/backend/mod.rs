use crate::error::BackendError;
use crate::models::{
    CreateNotificationRequest, Notification, NotificationFilter, NotificationPatch,
    PaginatedResult,
};
use async_trait::async_trait;

pub mod mock;

pub use mock::MockNotificationBackend;

/// The notification service the store talks to.
///
/// Implementations may be a network client or a local mock. Timeouts and
/// retries are the implementation's concern; the store never retries.
#[async_trait]
pub trait NotificationBackend: Send + Sync {
    async fn list(&self, filter: &NotificationFilter) -> Result<PaginatedResult, BackendError>;

    /// Create a notification. The backend assigns `id` and `created_at`.
    async fn create(&self, request: CreateNotificationRequest)
        -> Result<Notification, BackendError>;

    async fn update(&self, id: &str, patch: NotificationPatch)
        -> Result<Notification, BackendError>;

    async fn delete(&self, id: &str) -> Result<(), BackendError>;
}
