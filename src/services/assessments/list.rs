use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::AssessmentService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    assessments::requests::AssessmentListQuery,
    users::entities::UserRole,
};

/// 评估列表，按创建时间倒序
///
/// 教师只能看到自己提交的评估，校长和管理员不受限制。
pub async fn list_assessments(
    service: &AssessmentService,
    mut query: AssessmentListQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(user) = RequireJWT::extract_user_claims(request)
        && user.role == UserRole::Teacher
    {
        query.teacher_id = Some(user.id);
    }

    let storage = service.get_storage(request);

    match storage.list_assessments(query).await {
        Ok(assessments) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(assessments, "查询成功")))
        }
        Err(e) => {
            error!("Failed to list assessments: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询评估列表失败: {e}"),
                )),
            )
        }
    }
}

/// 某学生的历史评估，按周次倒序
pub async fn list_student_assessments(
    service: &AssessmentService,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_student_by_id(student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "学生不存在",
            )));
        }
        Err(e) => {
            error!("Failed to check student {}: {}", student_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询学生失败: {e}"),
                )),
            );
        }
    }

    match storage.list_assessments_by_student(student_id).await {
        Ok(assessments) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(assessments, "查询成功")))
        }
        Err(e) => {
            error!(
                "Failed to list assessments for student {}: {}",
                student_id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询历史评估失败: {e}"),
                )),
            )
        }
    }
}
