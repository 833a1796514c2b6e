use serde::Serialize;

use super::entities::Assessment;
use crate::models::common::pagination::PaginationInfo;

/// 科目评语视图（带科目名）
#[derive(Debug, Clone, Serialize)]
pub struct SubjectCommentView {
    pub subject_id: i64,
    pub subject_name: String,
    pub comment: String,
}

/// 评估详情响应：评估记录 + 学生/教师名 + 嵌套科目评语
#[derive(Debug, Serialize)]
pub struct AssessmentDetailResponse {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub student_name: String,
    pub teacher_name: String,
    pub subject_comments: Vec<SubjectCommentView>,
}

/// 列表条目：评估记录 + 学生名
#[derive(Debug, Serialize)]
pub struct AssessmentListItem {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub student_name: String,
}

/// 审批历史响应（分页）
#[derive(Debug, Serialize)]
pub struct ApprovedHistoryResponse {
    pub items: Vec<AssessmentListItem>,
    pub pagination: PaginationInfo,
}

/// 生命周期变更响应
///
/// notification_delivered=false 表示状态写入成功但通知投递失败
/// （降级成功，主流程不回滚，见错误处理约定）。
#[derive(Debug, Serialize)]
pub struct AssessmentMutationResponse {
    pub assessment_id: i64,
    pub notification_delivered: bool,
}
