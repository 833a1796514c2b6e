use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::AssessmentService;
use crate::models::{ApiResponse, ErrorCode, assessments::requests::ApprovedHistoryQuery};

/// 审批通过历史，分页按创建时间倒序
pub async fn approved_history(
    service: &AssessmentService,
    query: ApprovedHistoryQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_approved_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功"))),
        Err(e) => {
            error!("Failed to list approved history: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询审批历史失败: {e}"),
                )),
            )
        }
    }
}
