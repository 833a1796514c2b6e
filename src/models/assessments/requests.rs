use serde::Deserialize;
use std::collections::HashMap;

use super::entities::AssessmentStatus;

/// 创建评估请求（教师）
///
/// subject_comments 的键应覆盖学生班级当前的科目；缺失的科目按源数据
/// 质量问题处理而不报错，只遍历给定的条目。
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssessmentRequest {
    pub student_id: i64,
    pub date: String,
    pub week_number: i32,
    pub summary: String,
    #[serde(default)]
    pub subject_comments: HashMap<i64, String>,
    pub assessment_file: Option<String>,
}

/// 更新评估请求（教师重新提交）
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAssessmentRequest {
    pub date: String,
    pub week_number: i32,
    pub summary: String,
    #[serde(default)]
    pub subject_comments: HashMap<i64, String>,
}

/// 审批通过请求（校长）
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveAssessmentRequest {
    pub headteacher_comment: Option<String>,
}

/// 请求修改请求（校长）
#[derive(Debug, Clone, Deserialize)]
pub struct RequestChangesRequest {
    pub comment: String,
}

/// 评估列表查询
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentListQuery {
    pub status: Option<AssessmentStatus>,
    pub student_id: Option<i64>,
    pub teacher_id: Option<i64>,
}

/// 审批历史查询
///
/// 未显式传 size 时，页大小取配置中的 review.history_page_size。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovedHistoryQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
}
