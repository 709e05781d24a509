//! Pure queries over a slice of notifications.
//!
//! Shared by the store (statistics, derived counts) and the mock backend
//! (listing), so both sides agree on filtering and pagination rules.

use crate::error::{NotificationError, Result};
use crate::models::{
    Notification, NotificationFilter, NotificationStatistics, PaginatedResult, SortOrder,
};
use chrono::{DateTime, Utc};

/// Reject pagination parameters outside `1..=max_page_size`
pub fn validate_filter(filter: &NotificationFilter, max_page_size: u32) -> Result<()> {
    if filter.page == 0 {
        return Err(NotificationError::InvalidFilter(
            "page must be at least 1".to_string(),
        ));
    }
    if filter.page_size == 0 {
        return Err(NotificationError::InvalidFilter(
            "page size must be at least 1".to_string(),
        ));
    }
    if filter.page_size > max_page_size {
        return Err(NotificationError::InvalidFilter(format!(
            "page size {} exceeds maximum of {}",
            filter.page_size, max_page_size
        )));
    }
    Ok(())
}

pub fn matches(notification: &Notification, filter: &NotificationFilter) -> bool {
    if !notification.is_for(&filter.user_id) {
        return false;
    }
    if let Some(kind) = filter.notification_type {
        if notification.notification_type != kind {
            return false;
        }
    }
    if let Some(is_read) = filter.is_read {
        if notification.is_read != is_read {
            return false;
        }
    }
    if let Some(priority) = filter.priority {
        if notification.priority != priority {
            return false;
        }
    }
    true
}

pub fn count_unread(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}

pub fn unread_count_for(notifications: &[Notification], user_id: &str) -> usize {
    notifications
        .iter()
        .filter(|n| !n.is_read && n.is_for(user_id))
        .count()
}

/// Filter, sort and slice one page. Assumes the filter was validated.
pub fn paginate(notifications: &[Notification], filter: &NotificationFilter) -> PaginatedResult {
    let mut matching: Vec<&Notification> =
        notifications.iter().filter(|n| matches(n, filter)).collect();

    // Stable sort keeps insertion order between equal timestamps
    match filter.sort {
        SortOrder::NewestFirst => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::OldestFirst => matching.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }

    let total = matching.len();
    let page_size = filter.page_size as u64;
    let start = (filter.page.saturating_sub(1) as u64).saturating_mul(page_size);
    let end = (filter.page as u64).saturating_mul(page_size);

    let items = matching
        .into_iter()
        .skip(usize::try_from(start).unwrap_or(usize::MAX))
        .take(filter.page_size as usize)
        .cloned()
        .collect();

    PaginatedResult {
        items,
        total,
        unread_count: unread_count_for(notifications, &filter.user_id),
        page: filter.page,
        page_size: filter.page_size,
        has_next: end < total as u64,
        has_previous: filter.page > 1,
    }
}

/// Aggregate counts for one recipient. `today` is the UTC calendar day of `now`.
pub fn statistics(
    notifications: &[Notification],
    user_id: &str,
    now: DateTime<Utc>,
) -> NotificationStatistics {
    let today = now.date_naive();
    let mut stats = NotificationStatistics::default();

    for n in notifications.iter().filter(|n| n.is_for(user_id)) {
        stats.total_count += 1;
        if !n.is_read {
            stats.unread_count += 1;
        }
        if n.created_at.date_naive() == today {
            stats.today_count += 1;
        }
        *stats.count_by_type.entry(n.notification_type).or_insert(0) += 1;
        *stats.count_by_priority.entry(n.priority).or_insert(0) += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateNotificationRequest, NotificationPriority, NotificationType};
    use chrono::Duration;

    fn make(
        id: &str,
        user: &str,
        kind: NotificationType,
        priority: NotificationPriority,
        age_minutes: i64,
        read: bool,
    ) -> Notification {
        let created = Utc::now() - Duration::minutes(age_minutes);
        let mut n = Notification::from_request(
            id.to_string(),
            CreateNotificationRequest::new(user, kind, id, "body").with_priority(priority),
            created,
        );
        if read {
            n.mark_read(created);
        }
        n
    }

    fn fixture() -> Vec<Notification> {
        vec![
            make("a", "u1", NotificationType::System, NotificationPriority::Low, 30, true),
            make("b", "u1", NotificationType::Promotion, NotificationPriority::Normal, 20, false),
            make("c", "u1", NotificationType::OrderCreated, NotificationPriority::High, 10, false),
            make("d", "u2", NotificationType::System, NotificationPriority::Normal, 5, false),
        ]
    }

    #[test]
    fn validate_rejects_zero_page_and_size() {
        let ok = NotificationFilter::for_user("u1").page(1, 10);
        assert!(validate_filter(&ok, 100).is_ok());

        let zero_page = NotificationFilter::for_user("u1").page(0, 10);
        assert!(matches!(
            validate_filter(&zero_page, 100),
            Err(NotificationError::InvalidFilter(_))
        ));

        let zero_size = NotificationFilter::for_user("u1").page(1, 0);
        assert!(matches!(
            validate_filter(&zero_size, 100),
            Err(NotificationError::InvalidFilter(_))
        ));

        let too_big = NotificationFilter::for_user("u1").page(1, 101);
        assert!(validate_filter(&too_big, 100).is_err());
    }

    #[test]
    fn paginate_empty_collection() {
        let result = paginate(&[], &NotificationFilter::for_user("u1").page(1, 10));
        assert_eq!(result.total, 0);
        assert!(result.items.is_empty());
        assert!(!result.has_next);
        assert!(!result.has_previous);
        assert_eq!(result.unread_count, 0);
    }

    #[test]
    fn paginate_scopes_to_recipient_and_sorts_newest_first() {
        let data = fixture();
        let result = paginate(&data, &NotificationFilter::for_user("u1").page(1, 10));
        let ids: Vec<_> = result.items.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(result.total, 3);
        assert_eq!(result.unread_count, 2);
    }

    #[test]
    fn paginate_reports_neighbour_pages() {
        let data = fixture();
        let filter = NotificationFilter::for_user("u1")
            .page(2, 1)
            .sorted(SortOrder::OldestFirst);
        let result = paginate(&data, &filter);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].id, "b");
        assert!(result.has_next);
        assert!(result.has_previous);

        let last = paginate(&data, &filter.clone().page(3, 1));
        assert!(!last.has_next);

        let beyond = paginate(&data, &filter.page(9, 1));
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 3);
    }

    #[test]
    fn unread_count_ignores_non_recipient_filters() {
        let data = fixture();
        let filter = NotificationFilter::for_user("u1")
            .of_type(NotificationType::System)
            .read(true);
        let result = paginate(&data, &filter);
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].id, "a");
        assert_eq!(result.unread_count, 2);
    }

    #[test]
    fn priority_filter() {
        let data = fixture();
        let filter = NotificationFilter::for_user("u1").with_priority(NotificationPriority::High);
        let result = paginate(&data, &filter);
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].id, "c");
    }

    #[test]
    fn statistics_group_by_type_and_priority() {
        let mut data = fixture();
        data.push(make(
            "old",
            "u1",
            NotificationType::System,
            NotificationPriority::Low,
            60 * 24 * 3,
            false,
        ));

        let stats = statistics(&data, "u1", Utc::now());
        assert_eq!(stats.total_count, 4);
        assert_eq!(stats.unread_count, 3);
        assert_eq!(stats.count_by_type.get(&NotificationType::System), Some(&2));
        assert_eq!(stats.count_by_type.get(&NotificationType::Promotion), Some(&1));
        assert_eq!(stats.count_by_priority.get(&NotificationPriority::Low), Some(&2));
        assert_eq!(stats.count_by_priority.get(&NotificationPriority::Urgent), None);
        assert!(stats.today_count <= 3);
    }

    #[test]
    fn statistics_today_uses_calendar_day_of_now() {
        let data = fixture();
        let tomorrow = Utc::now() + Duration::days(1);
        assert_eq!(statistics(&data, "u1", tomorrow).today_count, 0);
    }
}
