use serde::Serialize;

use super::entities::{ArchivedUser, User};
use crate::models::common::pagination::PaginationInfo;

/// 用户列表响应
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub pagination: PaginationInfo,
}

/// 归档用户列表响应
#[derive(Debug, Serialize)]
pub struct ArchivedUserListResponse {
    pub items: Vec<ArchivedUser>,
}

/// 系统统计响应（管理员）
#[derive(Debug, Serialize)]
pub struct SystemStatisticsResponse {
    pub total_users: i64,
    pub total_assessments: i64,
    pub pending_reviews: i64,
}
