pub mod common;
pub mod error_code;

pub mod assessments;
pub mod auth;
pub mod classes;
pub mod notifications;
pub mod students;
pub mod subjects;
pub mod users;

pub use common::pagination::{PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;
pub use error_code::ErrorCode;

/// 应用启动时间，用于统计启动耗时
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
