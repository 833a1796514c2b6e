use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assessments::requests::{
    ApproveAssessmentRequest, ApprovedHistoryQuery, AssessmentListQuery, CreateAssessmentRequest,
    RequestChangesRequest, UpdateAssessmentRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AssessmentService;
use crate::utils::{SafeIDI64, SafeStudentIdI64};

// 懒加载的全局 AssessmentService 实例
static ASSESSMENT_SERVICE: Lazy<AssessmentService> = Lazy::new(AssessmentService::new_lazy);

// 评估列表
pub async fn list_assessments(
    req: HttpRequest,
    query: web::Query<AssessmentListQuery>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .list_assessments(query.into_inner(), &req)
        .await
}

// 提交评估
pub async fn create_assessment(
    req: HttpRequest,
    body: web::Json<CreateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .create_assessment(body.into_inner(), &req)
        .await
}

// 已审批评估的历史分页
pub async fn approved_history(
    req: HttpRequest,
    query: web::Query<ApprovedHistoryQuery>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .approved_history(query.into_inner(), &req)
        .await
}

// 某学生的历史评估
pub async fn list_student_assessments(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .list_student_assessments(student_id.0, &req)
        .await
}

// 评估详情
pub async fn get_assessment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.get_assessment(path.0, &req).await
}

// 重新提交评估
pub async fn update_assessment(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .update_assessment(path.0, body.into_inner(), &req)
        .await
}

// 审批通过
pub async fn approve_assessment(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<ApproveAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .approve_assessment(path.0, body.into_inner(), &req)
        .await
}

// 要求修改
pub async fn request_changes(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<RequestChangesRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .request_changes(path.0, body.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_assessments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assessments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 评估列表 - 所有登录用户可访问（业务层按角色过滤）
                    .route(web::get().to(list_assessments))
                    // 提交评估 - 仅教师和管理员
                    .route(
                        web::post()
                            .to(create_assessment)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            // 已审批历史 - 仅校长和管理员
            .service(
                web::resource("/history")
                    .route(web::get().to(approved_history))
                    .wrap(middlewares::RequireRole::new_any(
                        UserRole::headteacher_roles(),
                    )),
            )
            // 学生历史评估 - 所有登录用户可访问
            .service(
                web::resource("/students/{student_id}")
                    .route(web::get().to(list_student_assessments)),
            )
            .service(
                web::resource("/{id}")
                    // 评估详情 - 所有登录用户可访问
                    .route(web::get().to(get_assessment))
                    // 重新提交 - 仅教师和管理员（业务层校验归属）
                    .route(
                        web::put()
                            .to(update_assessment)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            // 审批通过 - 仅校长和管理员
            .service(
                web::resource("/{id}/approve")
                    .route(web::post().to(approve_assessment))
                    .wrap(middlewares::RequireRole::new_any(
                        UserRole::headteacher_roles(),
                    )),
            )
            // 要求修改 - 仅校长和管理员
            .service(
                web::resource("/{id}/request-changes")
                    .route(web::post().to(request_changes))
                    .wrap(middlewares::RequireRole::new_any(
                        UserRole::headteacher_roles(),
                    )),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MokaCacheWrapper, ObjectCache};
    use crate::models::assessments::entities::AssessmentStatus;
    use crate::storage::memory::{self, MemoryStorage};
    use crate::storage::Storage;
    use crate::utils::jwt::JwtUtils;
    use actix_web::{App, http::StatusCode, test, web::Data};
    use std::sync::Arc;

    // 评估记录没有删除接口：只在用户删除时随外键级联消失
    #[actix_web::test]
    async fn test_assessments_cannot_be_deleted_over_http() {
        let mem = Arc::new(MemoryStorage::new());
        mem.add_user(memory::teacher(1, "t.smith"));
        mem.add_assessment(memory::assessment(1, 5, 1, AssessmentStatus::Approved));

        let storage: Arc<dyn Storage> = mem.clone();
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::new());

        let app = test::init_service(
            App::new()
                .app_data(Data::new(storage))
                .app_data(Data::new(cache))
                .configure(configure_assessments_routes),
        )
        .await;

        let token = JwtUtils::generate_token_pair(1, &UserRole::Teacher, None)
            .unwrap()
            .access_token;

        // 即便持有合法令牌，DELETE 也不被接受
        let req = test::TestRequest::delete()
            .uri("/api/v1/assessments/1")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(matches!(
            resp.status(),
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
        ));

        // 评估记录原样保留
        assert!(mem.get_assessment_by_id(1).await.unwrap().is_some());
    }
}
