//! 审批流程的通知分发
//!
//! 通知写入失败不会回滚已经落库的评估变更，只记录日志并在响应中
//! 通过 notification_delivered 告知调用方。

use std::sync::Arc;

use tracing::warn;

use crate::models::notifications::{
    entities::NotificationType, requests::CreateNotificationRequest,
};
use crate::models::users::entities::UserRole;
use crate::storage::Storage;

/// 给单个用户发通知，返回是否成功
pub(crate) async fn notify_user(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    notification_type: NotificationType,
    message: String,
    assessment_id: Option<i64>,
) -> bool {
    let request = CreateNotificationRequest {
        user_id,
        message,
        notification_type,
        assessment_id,
    };

    match storage.create_notification(request).await {
        Ok(_) => true,
        Err(e) => {
            warn!(
                "Notification dispatch failed for user {} (assessment {:?}): {}",
                user_id, assessment_id, e
            );
            false
        }
    }
}

/// 新评估提交：广播给全体校长
///
/// 只要有一条写入失败就视为投递不完整。
pub(crate) async fn notify_all_headteachers(
    storage: &Arc<dyn Storage>,
    message: &str,
    assessment_id: i64,
) -> bool {
    let headteachers = match storage.list_users_by_role(UserRole::Headteacher).await {
        Ok(users) => users,
        Err(e) => {
            warn!("Failed to resolve headteachers for dispatch: {}", e);
            return false;
        }
    };

    if headteachers.is_empty() {
        warn!(
            "No headteachers to notify for assessment {}",
            assessment_id
        );
        return false;
    }

    let mut delivered = true;
    for headteacher in headteachers {
        let ok = notify_user(
            storage,
            headteacher.id,
            NotificationType::NewAssessment,
            message.to_string(),
            Some(assessment_id),
        )
        .await;
        delivered = delivered && ok;
    }

    delivered
}

/// 评估重新提交：只通知首位校长
///
/// 校长收件箱是共享的，一条通知全体校长都能看到。
pub(crate) async fn notify_first_headteacher(
    storage: &Arc<dyn Storage>,
    message: &str,
    assessment_id: i64,
) -> bool {
    let headteachers = match storage.list_users_by_role(UserRole::Headteacher).await {
        Ok(users) => users,
        Err(e) => {
            warn!("Failed to resolve headteachers for dispatch: {}", e);
            return false;
        }
    };

    let first = match headteachers.first() {
        Some(user) => user,
        None => {
            warn!(
                "No headteachers to notify for assessment {}",
                assessment_id
            );
            return false;
        }
    };

    notify_user(
        storage,
        first.id,
        NotificationType::AssessmentUpdated,
        message.to_string(),
        Some(assessment_id),
    )
    .await
}
