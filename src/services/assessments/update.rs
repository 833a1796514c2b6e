use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::{AssessmentService, dispatch};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    assessments::{requests::UpdateAssessmentRequest, responses::AssessmentMutationResponse},
    users::entities::UserRole,
};
use crate::utils::validate::{validate_assessment_date, validate_week_number};

/// 教师修改并重新提交评估
///
/// 重新提交会把审批进度重置为待审批并清空校长评语；科目评语按
/// 内容逐条比对，未变化的条目不产生写操作。
pub async fn update_assessment(
    service: &AssessmentService,
    assessment_id: i64,
    update_data: UpdateAssessmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    if let Err(msg) = validate_week_number(update_data.week_number) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    if let Err(msg) = validate_assessment_date(&update_data.date) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request);

    let existing = match storage.get_assessment_by_id(assessment_id).await {
        Ok(Some(assessment)) => assessment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssessmentNotFound,
                "评估不存在",
            )));
        }
        Err(e) => {
            error!("Failed to get assessment {}: {}", assessment_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询评估失败: {e}"),
                )),
            );
        }
    };

    // 教师只能改自己提交的评估
    if current_user.role == UserRole::Teacher && existing.teacher_id != current_user.id {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只能修改自己提交的评估",
        )));
    }

    let assessment = match storage
        .update_assessment_fields(
            assessment_id,
            &update_data.date,
            update_data.week_number,
            &update_data.summary,
        )
        .await
    {
        Ok(Some(assessment)) => assessment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssessmentNotFound,
                "评估不存在",
            )));
        }
        Err(e) => {
            error!("Failed to update assessment {}: {}", assessment_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("更新评估失败: {e}"),
                )),
            );
        }
    };

    // 逐条写入科目评语，内容一致的条目会被跳过
    for (subject_id, comment) in &update_data.subject_comments {
        if let Err(e) = storage
            .upsert_subject_comment(assessment_id, *subject_id, comment)
            .await
        {
            error!(
                "Failed to upsert subject comment (assessment {}, subject {}): {}",
                assessment_id, subject_id, e
            );
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("写入科目评语失败: {e}"),
                )),
            );
        }
    }

    let student_name = match storage.get_student_by_id(assessment.student_id).await {
        Ok(Some(student)) => student.name,
        _ => String::new(),
    };

    let message = format!(
        "{} 重新提交了 {} 第 {} 周的评估，等待审批",
        current_user.display_name(),
        student_name,
        assessment.week_number
    );
    let delivered =
        dispatch::notify_first_headteacher(&storage, &message, assessment.id).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AssessmentMutationResponse {
            assessment_id: assessment.id,
            notification_delivered: delivered,
        },
        "评估更新成功",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::entities::AssessmentStatus;
    use crate::models::notifications::entities::NotificationType;
    use crate::models::users::entities::User;
    use crate::storage::Storage;
    use crate::storage::memory::{self, MemoryStorage};
    use actix_web::{HttpMessage, http::StatusCode, test::TestRequest, web};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn resubmit_request() -> UpdateAssessmentRequest {
        UpdateAssessmentRequest {
            date: "2026-03-09".to_string(),
            week_number: 11,
            summary: "按校长意见补充了课堂细节".to_string(),
            subject_comments: HashMap::new(),
        }
    }

    fn request_as(mem: &Arc<MemoryStorage>, user: User) -> actix_web::HttpRequest {
        let storage: Arc<dyn Storage> = mem.clone();
        let req = TestRequest::default()
            .app_data(web::Data::new(storage))
            .to_http_request();
        req.extensions_mut().insert(user);
        req
    }

    #[actix_web::test]
    async fn test_resubmit_resets_review_state_and_notifies() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_user(memory::headteacher(2, "head01"));
        mem.add_user(memory::headteacher(3, "head02"));
        mem.add_student(memory::student(5, 9, "李明"));
        let mut reviewed = memory::assessment(1, 5, 1, AssessmentStatus::Approved);
        reviewed.headteacher_comment = Some("已阅".to_string());
        mem.add_assessment(reviewed);

        let req = request_as(&mem, memory::teacher(1, "t.smith"));
        let service = AssessmentService::new_lazy();

        let resp = update_assessment(&service, 1, resubmit_request(), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        // 重新提交后回到待审批，校长评语被清空
        let assessment = mem.get_assessment_by_id(1).await.unwrap().unwrap();
        assert_eq!(assessment.status, AssessmentStatus::Pending);
        assert_eq!(assessment.headteacher_comment, None);
        assert_eq!(assessment.week_number, 11);

        // 重新提交只通知首位校长，不再全体广播
        let notifications = mem.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].user_id, 2);
        assert_eq!(
            notifications[0].notification_type,
            NotificationType::AssessmentUpdated
        );
    }

    #[actix_web::test]
    async fn test_resubmit_rejected_for_foreign_assessment() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_user(memory::teacher(8, "t.jones"));
        mem.add_user(memory::headteacher(2, "head01"));
        mem.add_student(memory::student(5, 9, "李明"));
        mem.add_assessment(memory::assessment(1, 5, 1, AssessmentStatus::Approved));

        let req = request_as(&mem, memory::teacher(8, "t.jones"));
        let service = AssessmentService::new_lazy();

        let resp = update_assessment(&service, 1, resubmit_request(), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let assessment = mem.get_assessment_by_id(1).await.unwrap().unwrap();
        assert_eq!(assessment.status, AssessmentStatus::Approved);
        assert!(mem.notifications().is_empty());
    }
}
