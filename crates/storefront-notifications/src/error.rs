/// Errors surfaced by the notification store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification not found: {id}")]
    NotFound { id: String },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid notification request: {0}")]
    InvalidRequest(String),

    #[error("Notification backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Invalid store config: {0}")]
    InvalidConfig(String),
}

/// Errors reported by a notification backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Notification not found: {id}")]
    NotFound { id: String },

    #[error("{0}")]
    Unavailable(String),
}

impl From<BackendError> for NotificationError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound { id } => NotificationError::NotFound { id },
            BackendError::Unavailable(reason) => NotificationError::BackendUnavailable(reason),
        }
    }
}

pub type Result<T, E = NotificationError> = std::result::Result<T, E>;
