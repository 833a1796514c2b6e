use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::error;

use super::{AssessmentService, dispatch};
use crate::models::{
    ApiResponse, ErrorCode,
    assessments::{
        entities::{Assessment, AssessmentStatus},
        requests::{ApproveAssessmentRequest, RequestChangesRequest},
        responses::AssessmentMutationResponse,
    },
    notifications::entities::NotificationType,
};
use crate::storage::Storage;

/// 校长审批通过
///
/// 审批可以从任何状态写入，评语整体覆盖，传 None 即清空。
pub async fn approve_assessment(
    service: &AssessmentService,
    assessment_id: i64,
    approve_data: ApproveAssessmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let assessment = match storage
        .set_assessment_review(
            assessment_id,
            AssessmentStatus::Approved,
            approve_data.headteacher_comment.as_deref(),
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
            error!("Failed to approve assessment {}: {}", assessment_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("审批失败: {e}"),
                )),
            );
        }
    };

    let student_name = resolve_student_name(&storage, &assessment).await;
    let message = format!(
        "{} 第 {} 周的评估已通过审批",
        student_name, assessment.week_number
    );

    let delivered = dispatch::notify_user(
        &storage,
        assessment.teacher_id,
        NotificationType::AssessmentApproved,
        message,
        Some(assessment.id),
    )
    .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AssessmentMutationResponse {
            assessment_id: assessment.id,
            notification_delivered: delivered,
        },
        "审批通过",
    )))
}

/// 校长要求修改
///
/// 状态置为 changes-requested，评语为必填，通知提交教师。
pub async fn request_changes(
    service: &AssessmentService,
    assessment_id: i64,
    changes_data: RequestChangesRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if changes_data.comment.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "请填写修改意见",
        )));
    }

    let storage = service.get_storage(request);

    let assessment = match storage
        .set_assessment_review(
            assessment_id,
            AssessmentStatus::ChangesRequested,
            Some(&changes_data.comment),
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
            error!(
                "Failed to request changes for assessment {}: {}",
                assessment_id, e
            );
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("写入修改意见失败: {e}"),
                )),
            );
        }
    };

    let student_name = resolve_student_name(&storage, &assessment).await;
    let message = format!(
        "{} 第 {} 周的评估需要修改后重新提交",
        student_name, assessment.week_number
    );

    let delivered = dispatch::notify_user(
        &storage,
        assessment.teacher_id,
        NotificationType::AssessmentChangesRequested,
        message,
        Some(assessment.id),
    )
    .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AssessmentMutationResponse {
            assessment_id: assessment.id,
            notification_delivered: delivered,
        },
        "已要求修改",
    )))
}

async fn resolve_student_name(storage: &Arc<dyn Storage>, assessment: &Assessment) -> String {
    match storage.get_student_by_id(assessment.student_id).await {
        Ok(Some(student)) => student.name,
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::{self, MemoryStorage};
    use actix_web::{http::StatusCode, test::TestRequest, web};

    fn request_with(mem: &Arc<MemoryStorage>) -> actix_web::HttpRequest {
        let storage: Arc<dyn Storage> = mem.clone();
        TestRequest::default()
            .app_data(web::Data::new(storage))
            .to_http_request()
    }

    #[actix_web::test]
    async fn test_repeated_approval_overwrites_comment_and_renotifies() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_user(memory::headteacher(2, "head01"));
        mem.add_student(memory::student(5, 9, "李明"));
        mem.add_assessment(memory::assessment(1, 5, 1, AssessmentStatus::Pending));

        let req = request_with(&mem);
        let service = AssessmentService::new_lazy();

        let resp = approve_assessment(
            &service,
            1,
            ApproveAssessmentRequest {
                headteacher_comment: Some("写得很细致".to_string()),
            },
            &req,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let assessment = mem.get_assessment_by_id(1).await.unwrap().unwrap();
        assert_eq!(assessment.status, AssessmentStatus::Approved);
        assert_eq!(assessment.headteacher_comment.as_deref(), Some("写得很细致"));

        // 重复审批：评语整体覆盖（None 即清空），并再次通知教师
        let resp = approve_assessment(
            &service,
            1,
            ApproveAssessmentRequest {
                headteacher_comment: None,
            },
            &req,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let assessment = mem.get_assessment_by_id(1).await.unwrap().unwrap();
        assert_eq!(assessment.status, AssessmentStatus::Approved);
        assert_eq!(assessment.headteacher_comment, None);

        let notifications = mem.notifications();
        assert_eq!(notifications.len(), 2);
        for n in &notifications {
            assert_eq!(n.user_id, 1);
            assert_eq!(n.notification_type, NotificationType::AssessmentApproved);
            assert_eq!(n.assessment_id, Some(1));
        }
    }

    #[actix_web::test]
    async fn test_request_changes_requires_comment() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_user(memory::headteacher(2, "head01"));
        mem.add_assessment(memory::assessment(1, 5, 1, AssessmentStatus::Pending));

        let req = request_with(&mem);
        let service = AssessmentService::new_lazy();

        let resp = request_changes(
            &service,
            1,
            RequestChangesRequest {
                comment: "   ".to_string(),
            },
            &req,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let assessment = mem.get_assessment_by_id(1).await.unwrap().unwrap();
        assert_eq!(assessment.status, AssessmentStatus::Pending);
        assert!(mem.notifications().is_empty());
    }

    #[actix_web::test]
    async fn test_request_changes_marks_and_notifies_teacher() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_user(memory::headteacher(2, "head01"));
        mem.add_student(memory::student(5, 9, "李明"));
        mem.add_assessment(memory::assessment(1, 5, 1, AssessmentStatus::Pending));

        let req = request_with(&mem);
        let service = AssessmentService::new_lazy();

        let resp = request_changes(
            &service,
            1,
            RequestChangesRequest {
                comment: "请补充数学科目的细节".to_string(),
            },
            &req,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let assessment = mem.get_assessment_by_id(1).await.unwrap().unwrap();
        assert_eq!(assessment.status, AssessmentStatus::ChangesRequested);
        assert_eq!(
            assessment.headteacher_comment.as_deref(),
            Some("请补充数学科目的细节")
        );

        let notifications = mem.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].user_id, 1);
        assert_eq!(
            notifications[0].notification_type,
            NotificationType::AssessmentChangesRequested
        );
    }
}
