use serde::Deserialize;

use crate::models::common::pagination::PaginationQuery;

/// 创建学生请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub class_id: i64,
}

/// 更新学生请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub class_id: Option<i64>,
}

/// 学生列表查询
#[derive(Debug, Clone, Deserialize)]
pub struct StudentListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub class_id: Option<i64>,
}
