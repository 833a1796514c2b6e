use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::NotificationService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, notifications::responses::NotificationFeedResponse};

/// 通知信箱，未读/已读分区，各自按创建时间倒序
///
/// 校长读取的是共享收件箱：合并所有校长账号名下的通知。
pub async fn notification_feed(
    service: &NotificationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let storage = service.get_storage(request);

    let inbox_ids = match NotificationService::inbox_user_ids(&storage, &current_user).await {
        Ok(ids) => ids,
        Err(e) => {
            error!("Failed to resolve inbox for user {}: {}", current_user.id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询通知失败: {e}"),
                )),
            );
        }
    };

    match storage.list_notifications_for_users(&inbox_ids).await {
        Ok(notifications) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            NotificationFeedResponse::partition(notifications),
            "查询成功",
        ))),
        Err(e) => {
            error!(
                "Failed to list notifications for user {}: {}",
                current_user.id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询通知失败: {e}"),
                )),
            )
        }
    }
}
