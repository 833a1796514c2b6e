use super::entities::NotificationType;

/// 创建通知（仅由生命周期转换在内部调用，不走外部接口）
#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub message: String,
    pub notification_type: NotificationType,
    pub assessment_id: Option<i64>,
}
