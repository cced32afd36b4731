//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod chat_handler;
pub mod model_handler;
pub mod search_handler;

pub use chat_handler::*;
pub use model_handler::*;
pub use search_handler::*;

use axum::{Json, extract::rejection::JsonRejection};

use crate::error::AppError;

/// 请求体无法解析时按参数错误返回 400，而不是 axum 默认的纯文本
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(format!("Invalid request body: {}", rejection.body_text())))
}
