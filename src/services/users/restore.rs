use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::UserService;
use crate::models::{ApiResponse, ErrorCode};

/// 从归档表恢复用户，恢复后的账号状态为启用
///
/// 归档期间用户名可能已被新账号占用，恢复前先按用户名查重，
/// 占用时返回冲突而不是依赖数据库的唯一约束报错。
pub async fn restore_user(
    service: &UserService,
    archived_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let archived = match storage.get_archived_user_by_id(archived_id).await {
        Ok(Some(archived)) => archived,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ArchivedUserNotFound,
                "归档记录不存在",
            )));
        }
        Err(e) => {
            error!("Failed to get archived user {}: {}", archived_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询归档用户失败: {e}"),
                )),
            );
        }
    };

    match storage.get_user_by_username(&archived.username).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                "用户名已被占用，无法恢复",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            error!("Failed to check username {}: {}", archived.username, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("恢复用户失败: {e}"),
                )),
            );
        }
    }

    match storage.restore_archived_user(archived_id).await {
        Ok(Some(user)) => {
            info!("Archived user {} restored", user.username);
            Ok(HttpResponse::Ok().json(ApiResponse::success(user, "用户恢复成功")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ArchivedUserNotFound,
            "归档记录不存在",
        ))),
        Err(e) => {
            error!("Failed to restore archived user {}: {}", archived_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("恢复用户失败: {e}"),
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::{self, MemoryStorage};
    use actix_web::{http::StatusCode, test::TestRequest, web};
    use std::sync::Arc;

    fn request_with(mem: &Arc<MemoryStorage>) -> actix_web::HttpRequest {
        let storage: Arc<dyn Storage> = mem.clone();
        TestRequest::default()
            .app_data(web::Data::new(storage))
            .to_http_request()
    }

    #[actix_web::test]
    async fn test_restore_conflicts_when_username_reclaimed() {
        let mem = Arc::new(MemoryStorage::new());
        // 归档期间同名账号被重新创建
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_archived_user(memory::archived_user(7, "t.smith"));

        let req = request_with(&mem);
        let service = UserService::new_lazy();

        let resp = restore_user(&service, 7, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        // 归档记录保持原样，未被消费
        assert!(mem.get_archived_user_by_id(7).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_restore_succeeds_when_username_free() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_archived_user(memory::archived_user(7, "t.smith"));

        let req = request_with(&mem);
        let service = UserService::new_lazy();

        let resp = restore_user(&service, 7, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(mem.get_archived_user_by_id(7).await.unwrap().is_none());
        assert!(
            mem.get_user_by_username("t.smith")
                .await
                .unwrap()
                .is_some()
        );
    }
}
