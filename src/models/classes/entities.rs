use serde::{Deserialize, Serialize};

// 业务班级实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub id: i64,
    pub name: String,
    /// 任课教师，可为空（教师被删除后 SET NULL）
    pub teacher_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
