use serde::Deserialize;

/// 创建科目请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubjectRequest {
    pub name: String,
}

/// 更新科目请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubjectRequest {
    pub name: String,
}
