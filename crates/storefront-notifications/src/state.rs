use crate::models::Notification;
use crate::query;
use serde::Serialize;

/// Immutable snapshot of the store.
///
/// Counts are derived from the collection on every read and are never stored.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationState {
    notifications: Vec<Notification>,
    loading: bool,
}

impl NotificationState {
    pub(crate) fn loading() -> Self {
        Self {
            notifications: Vec::new(),
            loading: true,
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn unread_count(&self) -> usize {
        query::count_unread(&self.notifications)
    }

    pub fn has_unread(&self) -> bool {
        self.unread_count() > 0
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub(crate) fn finish_loading(&mut self) {
        self.loading = false;
    }

    /// Replace the whole collection, dropping duplicate ids (first one wins)
    pub(crate) fn replace_all(&mut self, notifications: Vec<Notification>) {
        self.notifications.clear();
        for n in notifications {
            if self.get(&n.id).is_some() {
                log::warn!("Dropping duplicate notification id {} from list", n.id);
                continue;
            }
            self.notifications.push(n);
        }
    }

    /// Append, or replace in place when the id is already present.
    /// Returns true when the record was appended.
    pub(crate) fn upsert(&mut self, notification: Notification) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == notification.id) {
            Some(existing) => {
                *existing = notification;
                false
            }
            None => {
                self.notifications.push(notification);
                true
            }
        }
    }

    /// Replace an existing record. Returns false when the id is unknown.
    pub(crate) fn replace(&mut self, notification: Notification) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == notification.id) {
            Some(existing) => {
                *existing = notification;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Notification> {
        let idx = self.notifications.iter().position(|n| n.id == id)?;
        Some(self.notifications.remove(idx))
    }
}
