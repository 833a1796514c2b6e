use serde::Serialize;

use super::entities::Notification;

/// 通知视图：通知记录 + 点击跳转目标（路由表见 NotificationType::route）
#[derive(Debug, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl From<Notification> for NotificationView {
    fn from(notification: Notification) -> Self {
        let link = notification
            .notification_type
            .route(notification.assessment_id);
        Self { notification, link }
    }
}

/// 通知信箱响应：未读/已读分区，各自按创建时间倒序。
/// 返回完整集合，下拉框只显示前几条已读是视图层的裁剪。
#[derive(Debug, Serialize)]
pub struct NotificationFeedResponse {
    pub unread: Vec<NotificationView>,
    pub read: Vec<NotificationView>,
}

impl NotificationFeedResponse {
    /// 将按创建时间倒序的通知列表分区为未读/已读
    pub fn partition(notifications: Vec<Notification>) -> Self {
        let (unread, read): (Vec<_>, Vec<_>) =
            notifications.into_iter().partition(|n| !n.is_read);
        Self {
            unread: unread.into_iter().map(NotificationView::from).collect(),
            read: read.into_iter().map(NotificationView::from).collect(),
        }
    }
}

/// 未读通知数量响应
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

/// 标记全部已读响应
#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub marked_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::entities::NotificationType;

    fn notification(id: i64, is_read: bool) -> Notification {
        Notification {
            id,
            user_id: 1,
            message: format!("notification {id}"),
            notification_type: NotificationType::NewAssessment,
            is_read,
            assessment_id: Some(id),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_partition_keeps_order_within_buckets() {
        // 输入已按创建时间倒序，分区后各桶内顺序不变
        let feed = NotificationFeedResponse::partition(vec![
            notification(4, false),
            notification(3, true),
            notification(2, false),
            notification(1, true),
        ]);
        let unread_ids: Vec<i64> = feed.unread.iter().map(|v| v.notification.id).collect();
        let read_ids: Vec<i64> = feed.read.iter().map(|v| v.notification.id).collect();
        assert_eq!(unread_ids, vec![4, 2]);
        assert_eq!(read_ids, vec![3, 1]);
    }

    #[test]
    fn test_view_carries_routing_link() {
        let view = NotificationView::from(notification(7, false));
        assert_eq!(view.link.as_deref(), Some("/headteacher/assessments/7"));
    }
}
