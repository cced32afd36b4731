//! Search Routes
//!
//! 定义学术检索相关的 API 路由。

use crate::api::handlers::search_handler::*;
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;

/// 创建搜索路由器
pub fn create_search_router() -> Router<AppState> {
    Router::new()
        .route("/search", post(search))
        .route("/search/health", get(search_health))
}
