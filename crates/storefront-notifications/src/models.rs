use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default page size used when a filter is built without explicit pagination
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Free-form payload attached to a notification for the UI to interpret
pub type NotificationData = serde_json::Map<String, serde_json::Value>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    OrderCreated,
    OrderPaid,
    OrderShipped,
    OrderDelivered,
    OrderCancelled,
    PaymentSuccess,
    PaymentFailed,
    Promotion,
    System,
    ProductBackInStock,
    PriceDrop,
    ReviewReply,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::OrderCreated => "order_created",
            NotificationType::OrderPaid => "order_paid",
            NotificationType::OrderShipped => "order_shipped",
            NotificationType::OrderDelivered => "order_delivered",
            NotificationType::OrderCancelled => "order_cancelled",
            NotificationType::PaymentSuccess => "payment_success",
            NotificationType::PaymentFailed => "payment_failed",
            NotificationType::Promotion => "promotion",
            NotificationType::System => "system",
            NotificationType::ProductBackInStock => "product_back_in_stock",
            NotificationType::PriceDrop => "price_drop",
            NotificationType::ReviewReply => "review_reply",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl NotificationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Low => "low",
            NotificationPriority::Normal => "normal",
            NotificationPriority::High => "high",
            NotificationPriority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipient ids of a notification.
///
/// On the wire this is either a single id or a list of ids; it is always
/// stored as a list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "RecipientsRepr", into = "Vec<String>")]
pub struct Recipients(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RecipientsRepr {
    One(String),
    Many(Vec<String>),
}

impl From<RecipientsRepr> for Recipients {
    fn from(repr: RecipientsRepr) -> Self {
        match repr {
            RecipientsRepr::One(id) => Recipients(vec![id]),
            RecipientsRepr::Many(ids) => Recipients(ids),
        }
    }
}

impl From<Recipients> for Vec<String> {
    fn from(recipients: Recipients) -> Self {
        recipients.0
    }
}

impl From<&str> for Recipients {
    fn from(id: &str) -> Self {
        Recipients(vec![id.to_string()])
    }
}

impl From<String> for Recipients {
    fn from(id: String) -> Self {
        Recipients(vec![id])
    }
}

impl From<Vec<String>> for Recipients {
    fn from(ids: Vec<String>) -> Self {
        Recipients(ids)
    }
}

impl Recipients {
    pub fn contains(&self, user_id: &str) -> bool {
        self.0.iter().any(|id| id == user_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn retain_non_blank(&mut self) {
        self.0.retain(|id| !id.trim().is_empty());
        for id in self.0.iter_mut() {
            *id = id.trim().to_string();
        }
    }
}

/// A user-facing alert.
///
/// `read_at` is set exactly when `is_read` is true. Read state is one-way:
/// once a notification is read it stays read until it is deleted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_ids: Recipients,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NotificationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build a fresh, unread notification from a create request
    pub fn from_request(
        id: String,
        request: CreateNotificationRequest,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_ids: request.user_ids,
            notification_type: request.notification_type,
            priority: request.priority.unwrap_or_default(),
            title: request.title,
            message: request.message,
            data: request.data,
            action_url: request.action_url,
            action_text: request.action_text,
            is_read: false,
            read_at: None,
            created_at,
        }
    }

    pub fn is_for(&self, user_id: &str) -> bool {
        self.user_ids.contains(user_id)
    }

    /// Mark as read at `at`. Returns false when it was already read, in which
    /// case `read_at` keeps its original value.
    pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.read_at = Some(at);
        true
    }
}

/// Input for creating a notification
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub user_ids: Recipients,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub priority: Option<NotificationPriority>,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub data: Option<NotificationData>,
    #[serde(default)]
    pub action_url: Option<String>,
    #[serde(default)]
    pub action_text: Option<String>,
}

impl CreateNotificationRequest {
    pub fn new(
        user_ids: impl Into<Recipients>,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_ids: user_ids.into(),
            notification_type,
            priority: None,
            title: title.into(),
            message: message.into(),
            data: None,
            action_url: None,
            action_text: None,
        }
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_data(mut self, data: NotificationData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_action(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self.action_text = Some(text.into());
        self
    }
}

/// Partial update accepted by the backend's `update` call.
///
/// Only the read state can change after creation.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl NotificationPatch {
    pub fn read_at(at: DateTime<Utc>) -> Self {
        Self {
            is_read: Some(true),
            read_at: Some(at),
        }
    }

    /// Apply to a record. Returns true when the record changed.
    pub fn apply(&self, notification: &mut Notification) -> bool {
        match self.is_read {
            Some(true) => notification.mark_read(self.read_at.unwrap_or_else(Utc::now)),
            Some(false) => {
                if notification.is_read {
                    log::debug!(
                        "Ignoring attempt to mark notification {} unread",
                        notification.id
                    );
                }
                false
            }
            None => false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Filter and pagination for listing a recipient's notifications
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilter {
    pub user_id: String,
    pub page: u32,
    pub page_size: u32,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<NotificationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<NotificationPriority>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl NotificationFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            notification_type: None,
            is_read: None,
            priority: None,
            sort: SortOrder::default(),
        }
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn of_type(mut self, notification_type: NotificationType) -> Self {
        self.notification_type = Some(notification_type);
        self
    }

    pub fn read(mut self, is_read: bool) -> Self {
        self.is_read = Some(is_read);
        self
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult {
    pub items: Vec<Notification>,
    pub total: usize,
    /// Unread count for the filter's recipient, independent of other filters
    pub unread_count: usize,
    pub page: u32,
    pub page_size: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStatistics {
    pub total_count: usize,
    pub unread_count: usize,
    pub today_count: usize,
    pub count_by_type: BTreeMap<NotificationType, usize>,
    pub count_by_priority: BTreeMap<NotificationPriority, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Notification {
        Notification::from_request(
            "notif-1".to_string(),
            CreateNotificationRequest::new("u1", NotificationType::System, "Hello", "World"),
            Utc::now(),
        )
    }

    #[test]
    fn recipients_accept_single_id_or_list() {
        let one: Recipients = serde_json::from_value(json!("mock-user-id")).unwrap();
        assert_eq!(one.len(), 1);
        assert!(one.contains("mock-user-id"));

        let many: Recipients = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(many.len(), 2);
        assert!(many.contains("b"));
        assert!(!many.contains("c"));

        assert_eq!(serde_json::to_value(&one).unwrap(), json!(["mock-user-id"]));
    }

    #[test]
    fn create_request_defaults_priority_to_normal() {
        let request: CreateNotificationRequest = serde_json::from_value(json!({
            "userIds": "mock-user-id",
            "type": "system",
            "title": "Test Notification",
            "message": "Test message"
        }))
        .unwrap();

        assert_eq!(request.priority, None);
        let notification = Notification::from_request("id".into(), request, Utc::now());
        assert_eq!(notification.priority, NotificationPriority::Normal);
        assert!(!notification.is_read);
        assert!(notification.read_at.is_none());
    }

    #[test]
    fn notification_uses_camel_case_wire_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["type"], "system");
        assert_eq!(value["priority"], "normal");
        assert_eq!(value["isRead"], false);
        assert!(value.get("userIds").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("readAt").is_none());
        assert!(value.get("actionUrl").is_none());
    }

    #[test]
    fn mark_read_sets_read_at_once() {
        let mut n = sample();
        let first = Utc::now();
        assert!(n.mark_read(first));
        assert_eq!(n.read_at, Some(first));

        let later = first + chrono::Duration::seconds(5);
        assert!(!n.mark_read(later));
        assert_eq!(n.read_at, Some(first));
    }

    #[test]
    fn patch_cannot_mark_unread() {
        let mut n = sample();
        n.mark_read(Utc::now());
        let patch = NotificationPatch {
            is_read: Some(false),
            read_at: None,
        };
        assert!(!patch.apply(&mut n));
        assert!(n.is_read);
        assert!(n.read_at.is_some());
    }

    #[test]
    fn enum_string_forms_match_serde() {
        assert_eq!(NotificationType::OrderCreated.as_str(), "order_created");
        assert_eq!(
            serde_json::to_value(NotificationType::ProductBackInStock).unwrap(),
            json!("product_back_in_stock")
        );
        assert_eq!(NotificationPriority::High.to_string(), "high");
    }
}
