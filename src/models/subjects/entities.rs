use serde::{Deserialize, Serialize};

// 业务科目实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}
