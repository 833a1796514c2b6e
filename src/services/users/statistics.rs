use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::UserService;
use crate::models::{ApiResponse, ErrorCode};

/// 系统统计：用户总数、评估总数、待审批评估数
pub async fn system_statistics(
    service: &UserService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.system_statistics().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats, "查询成功"))),
        Err(e) => {
            error!("Failed to collect system statistics: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询系统统计失败: {e}"),
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::entities::AssessmentStatus;
    use crate::storage::memory::{self, MemoryStorage};
    use crate::storage::Storage;
    use actix_web::{http::StatusCode, test::TestRequest, web};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_statistics_counts_users_and_pending_reviews() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_user(memory::headteacher(2, "head01"));
        mem.add_assessment(memory::assessment(1, 5, 1, AssessmentStatus::Pending));
        mem.add_assessment(memory::assessment(2, 5, 1, AssessmentStatus::Approved));
        mem.add_assessment(memory::assessment(3, 6, 1, AssessmentStatus::Pending));

        let storage: Arc<dyn Storage> = mem.clone();
        let req = TestRequest::default()
            .app_data(web::Data::new(storage))
            .to_http_request();

        let service = UserService::new_lazy();
        let resp = system_statistics(&service, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let stats = mem.system_statistics().await.unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_assessments, 3);
        assert_eq!(stats.pending_reviews, 2);
    }
}
