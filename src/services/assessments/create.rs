use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::{AssessmentService, dispatch};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    assessments::{requests::CreateAssessmentRequest, responses::AssessmentMutationResponse},
};
use crate::utils::validate::{validate_assessment_date, validate_week_number};

/// 教师提交周评估
///
/// 评估落库成功后向全体校长广播通知；通知失败不影响评估本身，
/// 响应中的 notification_delivered 会标记为 false。
pub async fn create_assessment(
    service: &AssessmentService,
    assessment_data: CreateAssessmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let teacher = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    if let Err(msg) = validate_week_number(assessment_data.week_number) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    if let Err(msg) = validate_assessment_date(&assessment_data.date) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request);

    // 学生必须存在
    let student = match storage.get_student_by_id(assessment_data.student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "学生不存在",
            )));
        }
        Err(e) => {
            error!("Failed to check student {}: {}", assessment_data.student_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询学生失败: {e}"),
                )),
            );
        }
    };

    // 学生所在班级必须配置了科目，否则科目评语无处挂靠
    match storage.get_class_subjects(student.class_id).await {
        Ok(subjects) if subjects.is_empty() => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ValidationFailed,
                "该班级尚未配置科目，无法提交评估",
            )));
        }
        Ok(_) => {}
        Err(e) => {
            error!("Failed to check class subjects: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询班级科目失败: {e}"),
                )),
            );
        }
    }

    let week_number = assessment_data.week_number;

    let assessment = match storage.create_assessment(teacher.id, assessment_data).await {
        Ok(assessment) => assessment,
        Err(e) => {
            error!("Assessment creation failed: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("创建评估失败: {e}"),
                )),
            );
        }
    };

    // 通知全体校长有新评估待审批
    let message = format!(
        "{} 提交了 {} 第 {} 周的评估，等待审批",
        teacher.display_name(),
        student.name,
        week_number
    );
    let delivered = dispatch::notify_all_headteachers(&storage, &message, assessment.id).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        AssessmentMutationResponse {
            assessment_id: assessment.id,
            notification_delivered: delivered,
        },
        "评估提交成功",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::entities::NotificationType;
    use crate::models::users::entities::User;
    use crate::storage::Storage;
    use crate::storage::memory::{self, MemoryStorage};
    use actix_web::{HttpMessage, http::StatusCode, test::TestRequest, web};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn submit_request(student_id: i64) -> CreateAssessmentRequest {
        CreateAssessmentRequest {
            student_id,
            date: "2026-03-02".to_string(),
            week_number: 10,
            summary: "本周课堂表现稳定".to_string(),
            subject_comments: HashMap::from([(301, "数学有进步".to_string())]),
            assessment_file: None,
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
    async fn test_create_broadcasts_to_every_headteacher() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_user(memory::headteacher(2, "head01"));
        mem.add_user(memory::headteacher(3, "head02"));
        mem.add_user(memory::headteacher(4, "head03"));
        mem.add_student(memory::student(5, 9, "李明"));
        mem.set_class_subjects(9, vec![memory::subject(301, "数学")]);

        let req = request_as(&mem, memory::teacher(1, "t.smith"));
        let service = AssessmentService::new_lazy();

        let resp = create_assessment(&service, submit_request(5), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let assessments = mem.assessments();
        assert_eq!(assessments.len(), 1);
        assert_eq!(
            assessments[0].status,
            crate::models::assessments::entities::AssessmentStatus::Pending
        );

        // 每位校长各收到一条新评估通知
        let notifications = mem.notifications();
        assert_eq!(notifications.len(), 3);
        let mut recipients: Vec<i64> = notifications
            .iter()
            .map(|n| {
                assert_eq!(n.notification_type, NotificationType::NewAssessment);
                assert_eq!(n.assessment_id, Some(assessments[0].id));
                n.user_id
            })
            .collect();
        recipients.sort_unstable();
        assert_eq!(recipients, vec![2, 3, 4]);
    }

    #[actix_web::test]
    async fn test_create_survives_notification_failure() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_user(memory::headteacher(2, "head01"));
        mem.add_student(memory::student(5, 9, "李明"));
        mem.set_class_subjects(9, vec![memory::subject(301, "数学")]);
        mem.fail_notifications();

        let req = request_as(&mem, memory::teacher(1, "t.smith"));
        let service = AssessmentService::new_lazy();

        let resp = create_assessment(&service, submit_request(5), &req)
            .await
            .unwrap();
        // 通知失败不回滚评估，仍视为创建成功
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(mem.assessments().len(), 1);
        assert!(mem.notifications().is_empty());
    }

    #[actix_web::test]
    async fn test_create_rejects_class_without_subjects() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_user(memory::headteacher(2, "head01"));
        mem.add_student(memory::student(5, 9, "李明"));

        let req = request_as(&mem, memory::teacher(1, "t.smith"));
        let service = AssessmentService::new_lazy();

        let resp = create_assessment(&service, submit_request(5), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(mem.assessments().is_empty());
    }
}
