use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::NotificationService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, notifications::responses::UnreadCountResponse};

/// 未读通知数，用于导航栏角标轮询
pub async fn unread_count(
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
                    format!("查询未读数失败: {e}"),
                )),
            );
        }
    };

    match storage.count_unread_notifications(&inbox_ids).await {
        Ok(unread_count) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UnreadCountResponse { unread_count },
            "查询成功",
        ))),
        Err(e) => {
            error!(
                "Failed to count unread notifications for user {}: {}",
                current_user.id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询未读数失败: {e}"),
                )),
            )
        }
    }
}
