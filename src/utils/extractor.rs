use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use std::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

// 路径参数安全提取器
//
// 从路径中取出指定名称的参数并解析为 i64，
// 解析失败时返回统一的 ApiResponse 错误而不是 actix 默认的纯文本 400。
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal, $label:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
                let parsed = req
                    .match_info()
                    .get($param)
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .filter(|id| *id > 0);

                ready(match parsed {
                    Some(id) => Ok($name(id)),
                    None => {
                        let response = HttpResponse::BadRequest().json(
                            ApiResponse::error_empty(
                                ErrorCode::BadRequest,
                                concat!($label, " 参数无效"),
                            ),
                        );
                        Err(InternalError::from_response(
                            concat!("invalid ", $param, " path parameter"),
                            response,
                        )
                        .into())
                    }
                })
            }
        }
    };
}

define_safe_i64_extractor!(SafeIDI64, "id", "ID");
define_safe_i64_extractor!(SafeStudentIdI64, "student_id", "学生ID");
