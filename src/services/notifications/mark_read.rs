use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::NotificationService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, notifications::responses::MarkAllReadResponse};

/// 标记单条通知已读
///
/// 只能操作自己收件箱内的通知（校长共享收件箱视为本人的）。
/// 已读通知重复标记是幂等的，依旧返回成功。
pub async fn mark_read(
    service: &NotificationService,
    notification_id: i64,
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

    let notification = match storage.get_notification_by_id(notification_id).await {
        Ok(Some(notification)) => notification,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::NotificationNotFound,
                "通知不存在",
            )));
        }
        Err(e) => {
            error!("Failed to get notification {}: {}", notification_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询通知失败: {e}"),
                )),
            );
        }
    };

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

    if !inbox_ids.contains(&notification.user_id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::NotificationAccessDenied,
            "无权操作该通知",
        )));
    }

    if notification.is_read {
        // 重复标记幂等
        return Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("通知已读")));
    }

    match storage.mark_notification_read(notification_id).await {
        Ok(_) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("通知已读"))),
        Err(e) => {
            error!(
                "Failed to mark notification {} read: {}",
                notification_id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("标记通知失败: {e}"),
                )),
            )
        }
    }
}

/// 标记收件箱内全部通知已读，返回本次实际标记的条数
pub async fn mark_all_read(
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
                    format!("标记通知失败: {e}"),
                )),
            );
        }
    };

    match storage.mark_all_notifications_read(&inbox_ids).await {
        Ok(marked_count) => {
            info!(
                "User {} marked {} notifications read",
                current_user.id, marked_count
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                MarkAllReadResponse { marked_count },
                "全部标记已读",
            )))
        }
        Err(e) => {
            error!(
                "Failed to mark all notifications read for user {}: {}",
                current_user.id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("标记通知失败: {e}"),
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::entities::NotificationType;
    use crate::models::users::entities::User;
    use crate::storage::Storage;
    use crate::storage::memory::{self, MemoryStorage};
    use actix_web::{HttpMessage, http::StatusCode, test::TestRequest, web};
    use std::sync::Arc;

    fn request_as(mem: &Arc<MemoryStorage>, user: User) -> actix_web::HttpRequest {
        let storage: Arc<dyn Storage> = mem.clone();
        let req = TestRequest::default()
            .app_data(web::Data::new(storage))
            .to_http_request();
        req.extensions_mut().insert(user);
        req
    }

    #[actix_web::test]
    async fn test_mark_read_is_idempotent() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_notification(memory::notification(
            11,
            1,
            NotificationType::AssessmentApproved,
        ));

        let req = request_as(&mem, memory::teacher(1, "t.smith"));
        let service = NotificationService::new_lazy();

        let resp = mark_read(&service, 11, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let notification = mem.get_notification_by_id(11).await.unwrap().unwrap();
        assert!(notification.is_read);

        // 已读通知重复标记：依旧返回成功，状态不变
        let resp = mark_read(&service, 11, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let notification = mem.get_notification_by_id(11).await.unwrap().unwrap();
        assert!(notification.is_read);
    }

    #[actix_web::test]
    async fn test_mark_read_rejected_for_foreign_notification() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_user(memory::teacher(8, "t.jones"));
        mem.add_notification(memory::notification(
            11,
            8,
            NotificationType::AssessmentApproved,
        ));

        let req = request_as(&mem, memory::teacher(1, "t.smith"));
        let service = NotificationService::new_lazy();

        let resp = mark_read(&service, 11, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let notification = mem.get_notification_by_id(11).await.unwrap().unwrap();
        assert!(!notification.is_read);
    }
}
