use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassService;
use crate::models::{
    ApiResponse, ErrorCode, PaginationQuery,
    classes::responses::ClassDetailResponse,
    students::requests::StudentListQuery,
};

/// 班级详情，附带科目列表与学生列表
pub async fn get_class(
    service: &ClassService,
    class_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let class = match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassNotFound,
                "班级不存在",
            )));
        }
        Err(e) => {
            error!("Failed to get class {}: {}", class_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询班级失败: {e}"),
                )),
            );
        }
    };

    let subjects = match storage.get_class_subjects(class_id).await {
        Ok(subjects) => subjects,
        Err(e) => {
            error!("Failed to get subjects for class {}: {}", class_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询班级科目失败: {e}"),
                )),
            );
        }
    };

    let students_query = StudentListQuery {
        pagination: PaginationQuery {
            page: 1,
            size: 100,
        },
        class_id: Some(class_id),
    };

    let students = match storage.list_students_with_pagination(students_query).await {
        Ok(response) => response.items,
        Err(e) => {
            error!("Failed to get students for class {}: {}", class_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询班级学生失败: {e}"),
                )),
            );
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ClassDetailResponse {
            class,
            subjects,
            students,
        },
        "查询成功",
    )))
}
