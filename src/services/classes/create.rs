use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassService;
use crate::models::{ApiResponse, ErrorCode, classes::requests::CreateClassRequest};

pub async fn create_class(
    service: &ClassService,
    class_data: CreateClassRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if class_data.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "班级名称不能为空",
        )));
    }

    let storage = service.get_storage(request);

    match storage.create_class(class_data).await {
        Ok(class) => Ok(HttpResponse::Created().json(ApiResponse::success(class, "班级创建成功"))),
        Err(e) => {
            let msg = format!("Class creation failed: {e}");
            error!("{}", msg);
            if msg.contains("UNIQUE constraint failed") {
                Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::Conflict,
                    "班级名称已存在",
                )))
            } else {
                Ok(HttpResponse::InternalServerError()
                    .json(ApiResponse::error_empty(ErrorCode::InternalServerError, msg)))
            }
        }
    }
}
