use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::NotificationService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};

/// 删除通知，只能删除自己收件箱内的通知
pub async fn delete_notification(
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
                    format!("删除通知失败: {e}"),
                )),
            );
        }
    };

    if !inbox_ids.contains(&notification.user_id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::NotificationAccessDenied,
            "无权删除该通知",
        )));
    }

    match storage.delete_notification(notification_id).await {
        Ok(true) => {
            info!(
                "Notification {} deleted by user {}",
                notification_id, current_user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("通知删除成功")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotificationNotFound,
            "通知不存在",
        ))),
        Err(e) => {
            error!("Failed to delete notification {}: {}", notification_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("删除通知失败: {e}"),
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
    async fn test_delete_rejected_for_foreign_notification() {
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

        let resp = delete_notification(&service, 11, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        // 通知仍在原收件箱中
        assert!(mem.get_notification_by_id(11).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_headteacher_can_delete_from_shared_inbox() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::headteacher(2, "head01"));
        mem.add_user(memory::headteacher(3, "head02"));
        // 通知落在另一位校长名下，共享收件箱内可以删除
        mem.add_notification(memory::notification(
            11,
            3,
            NotificationType::NewAssessment,
        ));

        let req = request_as(&mem, memory::headteacher(2, "head01"));
        let service = NotificationService::new_lazy();

        let resp = delete_notification(&service, 11, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(mem.get_notification_by_id(11).await.unwrap().is_none());
    }
}
