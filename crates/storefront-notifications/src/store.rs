use crate::backend::NotificationBackend;
use crate::config::StoreConfig;
use crate::error::{NotificationError, Result};
use crate::events::NotificationEvent;
use crate::models::{
    CreateNotificationRequest, Notification, NotificationFilter, NotificationPatch,
    NotificationStatistics, PaginatedResult,
};
use crate::query;
use crate::sanitize;
use crate::state::NotificationState;
use chrono::{Duration, Utc};
use futures::future::try_join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Authoritative in-memory collection of the current user's notifications.
///
/// State is held in a `watch` channel of immutable snapshots: readers either
/// take a snapshot or subscribe to every new one. Mutations happen only after
/// the backend call they depend on has succeeded, and are applied in one
/// synchronous step, so a failed call never leaves a partial update behind.
pub struct NotificationStore {
    backend: Arc<dyn NotificationBackend>,
    config: StoreConfig,
    state: watch::Sender<NotificationState>,
    events: broadcast::Sender<NotificationEvent>,
    initialized: AtomicBool,
}

impl NotificationStore {
    /// Create a store in the loading state. Call `initialize` to fetch the list.
    ///
    /// Fails with `InvalidConfig` if `config` does not pass `StoreConfig::validate`.
    pub fn new(backend: Arc<dyn NotificationBackend>, config: StoreConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| NotificationError::InvalidConfig(e.to_string()))?;

        let (state, _) = watch::channel(NotificationState::loading());
        let (events, _) = broadcast::channel(config.event_capacity);
        Ok(Self {
            backend,
            config,
            state,
            events,
            initialized: AtomicBool::new(false),
        })
    }

    /// Create a store and schedule its initial load on the current tokio runtime
    pub fn spawn(backend: Arc<dyn NotificationBackend>, config: StoreConfig) -> Result<Arc<Self>> {
        let store = Arc::new(Self::new(backend, config)?);
        let loader = store.clone();
        tokio::spawn(async move {
            if let Err(e) = loader.initialize().await {
                log::error!("NotificationStore: initial load failed: {}", e);
            }
        });
        Ok(store)
    }

    /// Validated configuration the store was built with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Fetch the initial list. Runs once; later calls return immediately.
    ///
    /// `loading` is cleared whether the fetch succeeds or not. On failure the
    /// collection stays empty and the error is returned.
    pub async fn initialize(&self) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            log::debug!("NotificationStore: already initialized, skipping");
            return Ok(());
        }

        log::info!(
            "NotificationStore: loading notifications for {}",
            self.config.recipient_id
        );

        match self.backend.list(&self.initial_filter()).await {
            Ok(page) => {
                let count = page.items.len();
                self.state.send_modify(|state| {
                    state.replace_all(page.items);
                    state.finish_loading();
                });
                log::info!("NotificationStore: loaded {} notifications", count);
                self.emit(NotificationEvent::Loaded { count });
                Ok(())
            }
            Err(e) => {
                self.state.send_modify(|state| state.finish_loading());
                Err(e.into())
            }
        }
    }

    /// Re-fetch the list and replace the collection. Does not toggle `loading`.
    pub async fn refresh(&self) -> Result<usize> {
        let page = self.backend.list(&self.initial_filter()).await?;
        let count = page.items.len();
        self.state.send_modify(|state| state.replace_all(page.items));
        log::debug!("NotificationStore: refreshed, {} notifications", count);
        self.emit(NotificationEvent::Loaded { count });
        Ok(count)
    }

    fn initial_filter(&self) -> NotificationFilter {
        NotificationFilter::for_user(self.config.recipient_id.clone())
            .page(1, self.config.initial_page_size)
    }

    /// Current state as an owned snapshot
    pub fn snapshot(&self) -> NotificationState {
        self.state.borrow().clone()
    }

    /// Observe every new snapshot
    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.state.subscribe()
    }

    /// Observe change events emitted after each successful mutation
    pub fn events(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }

    /// Copy of the current collection in store order
    pub fn notifications(&self) -> Vec<Notification> {
        self.state.borrow().notifications().to_vec()
    }

    /// True until the initial fetch has resolved
    pub fn loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Unread notifications in the collection, counted on every call
    pub fn unread_count(&self) -> usize {
        self.state.borrow().unread_count()
    }

    /// Whether `unread_count` is above zero
    pub fn has_unread(&self) -> bool {
        self.state.borrow().has_unread()
    }

    /// Look up a notification in the local collection, or `NotFound`
    pub fn get_notification(&self, id: &str) -> Result<Notification> {
        self.state
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| NotificationError::NotFound { id: id.to_string() })
    }

    /// Query a filtered page from the backend. Invalid pagination is rejected
    /// before any backend call is made.
    pub async fn get_notifications(&self, filter: &NotificationFilter) -> Result<PaginatedResult> {
        query::validate_filter(filter, self.config.max_page_size)?;
        Ok(self.backend.list(filter).await?)
    }

    /// Sanitize a request, create it on the backend and add the result.
    ///
    /// After sanitization the request must still have a non-empty title and at
    /// least one recipient, otherwise it fails with `InvalidRequest` and the
    /// backend is never called. A returned id that already exists replaces
    /// the held record in place.
    pub async fn create_notification(
        &self,
        request: CreateNotificationRequest,
    ) -> Result<Notification> {
        let request = sanitize::sanitize_request(request);
        sanitize::validate_request(&request)?;

        let created = self.backend.create(request).await?;

        let mut appended = false;
        self.state.send_modify(|state| appended = state.upsert(created.clone()));
        if !appended {
            log::warn!(
                "NotificationStore: backend returned existing id {}, replaced in place",
                created.id
            );
        }
        log::info!(
            "NotificationStore: created {} notification {}",
            created.notification_type,
            created.id
        );
        self.emit(NotificationEvent::Created {
            notification: created.clone(),
        });
        Ok(created)
    }

    /// Mark one notification read. Already-read notifications are returned
    /// unchanged without a backend call.
    pub async fn mark_as_read(&self, id: &str) -> Result<Notification> {
        let current = self.get_notification(id)?;
        if current.is_read {
            log::debug!("NotificationStore: {} already read", id);
            return Ok(current);
        }

        let updated = self
            .backend
            .update(id, NotificationPatch::read_at(Utc::now()))
            .await?;

        if !self.state.send_if_modified(|state| state.replace(updated.clone())) {
            // Deleted while the update was in flight
            return Err(NotificationError::NotFound { id: id.to_string() });
        }
        self.emit(NotificationEvent::Read { id: id.to_string() });
        Ok(updated)
    }

    /// Mark every unread notification addressed to `user_id` as read.
    ///
    /// All backend updates must succeed before any local change is applied.
    /// Returns how many notifications changed.
    pub async fn mark_all_as_read(&self, user_id: &str) -> Result<usize> {
        let targets: Vec<String> = self
            .state
            .borrow()
            .notifications()
            .iter()
            .filter(|n| !n.is_read && n.is_for(user_id))
            .map(|n| n.id.clone())
            .collect();

        if targets.is_empty() {
            return Ok(0);
        }

        let read_at = Utc::now();
        let updated = try_join_all(
            targets
                .iter()
                .map(|id| self.backend.update(id, NotificationPatch::read_at(read_at))),
        )
        .await?;

        let mut count = 0;
        self.state.send_if_modified(|state| {
            for n in updated {
                if state.replace(n) {
                    count += 1;
                }
            }
            count > 0
        });

        log::info!(
            "NotificationStore: marked {} notifications read for {}",
            count,
            user_id
        );
        self.emit(NotificationEvent::AllRead {
            user_id: user_id.to_string(),
            count,
        });
        Ok(count)
    }

    /// Delete on the backend, then drop it from the collection. Unknown ids are `NotFound`.
    pub async fn delete_notification(&self, id: &str) -> Result<()> {
        self.get_notification(id)?;
        self.backend.delete(id).await?;

        self.state.send_if_modified(|state| state.remove(id).is_some());
        log::info!("NotificationStore: deleted notification {}", id);
        self.emit(NotificationEvent::Deleted { id: id.to_string() });
        Ok(())
    }

    /// Aggregate counts for `user_id` over the current collection
    pub fn get_statistics(&self, user_id: &str) -> NotificationStatistics {
        query::statistics(self.state.borrow().notifications(), user_id, Utc::now())
    }

    /// Delete read notifications older than the configured retention window.
    ///
    /// Each deletion is applied as soon as the backend confirms it. The first
    /// backend failure stops the sweep: records already deleted stay removed,
    /// a `Cleaned` event reports them, and the error is returned.
    pub async fn cleanup_read(&self) -> Result<usize> {
        let days = self.config.retention_days;
        let cutoff = Duration::try_days(days)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| {
                NotificationError::InvalidConfig(format!("retention_days {} out of range", days))
            })?;
        let expired: Vec<String> = self
            .state
            .borrow()
            .notifications()
            .iter()
            .filter(|n| n.is_read && n.created_at < cutoff)
            .map(|n| n.id.clone())
            .collect();

        let mut removed = 0;
        for id in expired {
            if let Err(e) = self.backend.delete(&id).await {
                log::warn!("NotificationStore: cleanup stopped at {}: {}", id, e);
                if removed > 0 {
                    self.emit(NotificationEvent::Cleaned { count: removed });
                }
                return Err(e.into());
            }
            if self.state.send_if_modified(|state| state.remove(&id).is_some()) {
                removed += 1;
            }
        }

        if removed > 0 {
            log::info!("NotificationStore: cleaned up {} read notifications", removed);
            self.emit(NotificationEvent::Cleaned { count: removed });
        }
        Ok(removed)
    }

    fn emit(&self, event: NotificationEvent) {
        // No listeners is fine
        let _ = self.events.send(event);
    }
}
