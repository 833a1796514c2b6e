use serde::Deserialize;

use super::entities::{UserRole, UserStatus};
use crate::models::common::pagination::PaginationQuery;

/// 创建用户请求（管理员）
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub full_name: Option<String>,
    /// 角色为 teacher 时，可同时指派为某班级的任课教师
    pub class_id: Option<i64>,
}

/// 更新用户请求（管理员）
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub full_name: Option<String>,
    /// 角色为 teacher 时，重设其任课班级（设置语义，None 表示不变）
    pub class_ids: Option<Vec<i64>>,
}

/// 用户列表查询
#[derive(Debug, Clone, Deserialize)]
pub struct UserListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub role: Option<UserRole>,
    pub search: Option<String>,
}
