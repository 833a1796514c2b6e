use serde::Serialize;

use super::entities::Student;
use crate::models::common::pagination::PaginationInfo;

/// 学生列表响应
#[derive(Debug, Serialize)]
pub struct StudentListResponse {
    pub items: Vec<Student>,
    pub pagination: PaginationInfo,
}
