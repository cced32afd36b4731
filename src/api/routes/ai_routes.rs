//! AI Routes
//!
//! 对话与模型状态路由。

use crate::api::handlers::{chat_handler::chat, model_handler::*};
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;

/// 创建 AI 路由器
pub fn create_ai_router() -> Router<AppState> {
    Router::new()
        .route("/ai/chat", post(chat))
        .route("/ai/stats", get(get_stats))
        .route("/ai/test", post(test_model))
}
