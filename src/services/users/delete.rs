use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};

/// 删除用户前先写入归档表，保留恢复的可能
pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 不允许删除自己
    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "不能删除当前登录的账号",
        )));
    }

    let storage = service.get_storage(request);

    match storage.archive_and_delete_user(user_id).await {
        Ok(Some(archived)) => {
            info!("User {} archived and deleted", archived.username);
            Ok(HttpResponse::Ok().json(ApiResponse::success(archived, "用户已归档并删除")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "用户不存在",
        ))),
        Err(e) => {
            error!("Failed to delete user {}: {}", user_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("删除用户失败: {e}"),
                )),
            )
        }
    }
}
