use serde::Deserialize;

use crate::models::common::pagination::PaginationQuery;

/// 创建班级请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassRequest {
    pub name: String,
    /// 班级开设的科目，多对多关联
    #[serde(default)]
    pub subject_ids: Vec<i64>,
}

/// 更新班级请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub teacher_id: Option<i64>,
    /// 设置语义：给定时整体替换班级科目
    pub subject_ids: Option<Vec<i64>>,
}

/// 班级列表查询
#[derive(Debug, Clone, Deserialize)]
pub struct ClassListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub teacher_id: Option<i64>,
}
