pub mod create;
pub mod detail;
pub mod dispatch;
pub mod history;
pub mod list;
pub mod review;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assessments::requests::{
    ApproveAssessmentRequest, ApprovedHistoryQuery, AssessmentListQuery, CreateAssessmentRequest,
    RequestChangesRequest, UpdateAssessmentRequest,
};
use crate::storage::Storage;

pub struct AssessmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssessmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 教师提交评估
    pub async fn create_assessment(
        &self,
        assessment_data: CreateAssessmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assessment(self, assessment_data, request).await
    }

    // 教师修改并重新提交评估
    pub async fn update_assessment(
        &self,
        assessment_id: i64,
        update_data: UpdateAssessmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_assessment(self, assessment_id, update_data, request).await
    }

    // 校长审批通过
    pub async fn approve_assessment(
        &self,
        assessment_id: i64,
        approve_data: ApproveAssessmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        review::approve_assessment(self, assessment_id, approve_data, request).await
    }

    // 校长要求修改
    pub async fn request_changes(
        &self,
        assessment_id: i64,
        changes_data: RequestChangesRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        review::request_changes(self, assessment_id, changes_data, request).await
    }

    // 评估列表
    pub async fn list_assessments(
        &self,
        query: AssessmentListQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_assessments(self, query, request).await
    }

    // 某学生的历史评估（周次倒序）
    pub async fn list_student_assessments(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_student_assessments(self, student_id, request).await
    }

    // 评估详情
    pub async fn get_assessment(
        &self,
        assessment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        detail::get_assessment(self, assessment_id, request).await
    }

    // 审批通过历史（分页）
    pub async fn approved_history(
        &self,
        query: ApprovedHistoryQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        history::approved_history(self, query, request).await
    }
}
