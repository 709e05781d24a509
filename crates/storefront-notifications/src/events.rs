use crate::models::Notification;
use serde::Serialize;

/// Change feed emitted by the store after each successful mutation
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    Loaded { count: usize },
    Created { notification: Notification },
    Read { id: String },
    AllRead { user_id: String, count: usize },
    Deleted { id: String },
    Cleaned { count: usize },
}

impl NotificationEvent {
    /// Event name in the same `core://` namespace the UI listens on
    pub fn channel(&self) -> &'static str {
        match self {
            NotificationEvent::Created { .. } => "core://notification",
            NotificationEvent::Loaded { .. } | NotificationEvent::Cleaned { .. } => {
                "core://notification-list"
            }
            NotificationEvent::Read { .. }
            | NotificationEvent::AllRead { .. }
            | NotificationEvent::Deleted { .. } => "core://notification-updated",
        }
    }
}
