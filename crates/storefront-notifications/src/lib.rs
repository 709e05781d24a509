//! User notification state for the storefront.
//!
//! [`NotificationStore`] owns the current user's notifications in memory and
//! keeps them in step with a [`NotificationBackend`] (a real service or the
//! bundled [`MockNotificationBackend`]). The UI reads snapshots or subscribes
//! to them; unread counts are always derived from the current collection.

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod query;
pub mod sanitize;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use backend::{MockNotificationBackend, NotificationBackend};
pub use config::StoreConfig;
pub use error::{BackendError, NotificationError};
pub use events::NotificationEvent;
pub use models::{
    CreateNotificationRequest, Notification, NotificationFilter, NotificationPatch,
    NotificationPriority, NotificationStatistics, NotificationType, PaginatedResult, Recipients,
    SortOrder,
};
pub use state::NotificationState;
pub use store::NotificationStore;
