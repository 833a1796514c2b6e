//! 业务错误码定义
//!
//! 错误码按 HTTP 状态码分段：4xxxx 客户端错误，5xxxx 服务端错误。

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 40000,
    ValidationFailed = 40001,

    Unauthorized = 40100,
    AuthFailed = 40101,

    Forbidden = 40300,
    NotificationAccessDenied = 40301,

    NotFound = 40400,
    UserNotFound = 40401,
    ClassNotFound = 40402,
    SubjectNotFound = 40403,
    StudentNotFound = 40404,
    AssessmentNotFound = 40405,
    NotificationNotFound = 40406,
    ArchivedUserNotFound = 40407,

    Conflict = 40900,
    UserAlreadyExists = 40901,

    InternalServerError = 50000,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::AssessmentNotFound as i32, 40405);
        assert_eq!(ErrorCode::InternalServerError as i32, 50000);
    }
}
