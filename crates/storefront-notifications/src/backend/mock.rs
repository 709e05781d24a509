use super::NotificationBackend;
use crate::config::StoreConfig;
use crate::error::BackendError;
use crate::models::{
    CreateNotificationRequest, Notification, NotificationFilter, NotificationPatch,
    NotificationPriority, NotificationType, PaginatedResult,
};
use crate::query;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// In-memory backend with artificial latency.
///
/// Every call sleeps for the configured latency first, then fails with
/// `Unavailable` if the backend has been switched offline.
pub struct MockNotificationBackend {
    records: Mutex<Vec<Notification>>,
    latency: Duration,
    available: AtomicBool,
    calls: AtomicUsize,
}

impl MockNotificationBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            latency,
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    /// Backend pre-filled with `sample_notifications` for the configured recipient
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.mock_latency())
            .with_notifications(sample_notifications(&config.recipient_id))
    }

    pub fn with_notifications(self, notifications: Vec<Notification>) -> Self {
        *self.records() = notifications;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of calls that reached the backend (including failed ones)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copy of everything the backend currently holds
    pub fn stored(&self) -> Vec<Notification> {
        self.records().clone()
    }

    fn records(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn round_trip(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(
                "mock notification backend is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationBackend for MockNotificationBackend {
    async fn list(&self, filter: &NotificationFilter) -> Result<PaginatedResult, BackendError> {
        self.round_trip().await?;
        Ok(query::paginate(&self.records(), filter))
    }

    async fn create(
        &self,
        request: CreateNotificationRequest,
    ) -> Result<Notification, BackendError> {
        self.round_trip().await?;
        let id = format!("notif-{}", uuid::Uuid::new_v4());
        let notification = Notification::from_request(id, request, Utc::now());
        self.records().push(notification.clone());
        log::debug!("Mock backend created notification {}", notification.id);
        Ok(notification)
    }

    async fn update(
        &self,
        id: &str,
        patch: NotificationPatch,
    ) -> Result<Notification, BackendError> {
        self.round_trip().await?;
        let mut records = self.records();
        let record = records
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| BackendError::NotFound { id: id.to_string() })?;
        patch.apply(record);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.round_trip().await?;
        let mut records = self.records();
        let before = records.len();
        records.retain(|n| n.id != id);
        if records.len() == before {
            return Err(BackendError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}

/// A small storefront inbox: one read welcome message and three unread alerts
pub fn sample_notifications(user_id: &str) -> Vec<Notification> {
    let now = Utc::now();
    let make = |id: &str, request: CreateNotificationRequest, age: ChronoDuration| {
        Notification::from_request(id.to_string(), request, now - age)
    };

    let mut welcome = make(
        "notif-welcome",
        CreateNotificationRequest::new(
            user_id,
            NotificationType::System,
            "Welcome to the store",
            "Your account is ready. Start browsing today's picks.",
        )
        .with_priority(NotificationPriority::Low),
        ChronoDuration::days(3),
    );
    welcome.mark_read(now - ChronoDuration::days(2));

    let shipped = make(
        "notif-order-shipped",
        CreateNotificationRequest::new(
            user_id,
            NotificationType::OrderShipped,
            "Your order has shipped",
            "Order #10231 is on its way.",
        )
        .with_priority(NotificationPriority::High)
        .with_data(json_map(json!({ "orderId": "10231", "carrier": "post" })))
        .with_action("/orders/10231", "Track order"),
        ChronoDuration::hours(5),
    );

    let promotion = make(
        "notif-weekend-sale",
        CreateNotificationRequest::new(
            user_id,
            NotificationType::Promotion,
            "Weekend sale",
            "Selected items are 20% off until Sunday.",
        )
        .with_action("/products?sale=weekend", "Shop now"),
        ChronoDuration::hours(2),
    );

    let price_drop = make(
        "notif-price-drop",
        CreateNotificationRequest::new(
            user_id,
            NotificationType::PriceDrop,
            "Price drop on your wishlist",
            "An item on your wishlist dropped in price.",
        )
        .with_data(json_map(json!({ "productId": "p-778" }))),
        ChronoDuration::minutes(30),
    );

    vec![welcome, shipped, promotion, price_drop]
}

fn json_map(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
