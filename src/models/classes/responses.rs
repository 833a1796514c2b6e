use serde::Serialize;

use super::entities::Class;
use crate::models::common::pagination::PaginationInfo;
use crate::models::students::entities::Student;
use crate::models::subjects::entities::Subject;

/// 班级列表响应
#[derive(Debug, Serialize)]
pub struct ClassListResponse {
    pub items: Vec<Class>,
    pub pagination: PaginationInfo,
}

/// 班级详情响应（含科目与学生）
#[derive(Debug, Serialize)]
pub struct ClassDetailResponse {
    #[serde(flatten)]
    pub class: Class,
    pub subjects: Vec<Subject>,
    pub students: Vec<Student>,
}
