//! 对话 DTO
//!
//! 定义对话相关的请求和响应数据结构。

use serde::{Deserialize, Serialize};

use crate::models::chat::ModelBackend;
use crate::services::ChatOutcome;

/// 对话请求
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatRequest {
    /// 用户消息
    pub message: Option<String>,
    /// 会话 ID
    pub chat_id: Option<String>,
    /// 已上传文档名
    pub pdfs: Vec<String>,
    /// normal / online / document
    pub mode: Option<String>,
}

/// 对话响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub chat_id: String,
    pub reply: String,
    /// 没有引用时为空数组
    pub citations: Vec<String>,
    pub model: ModelBackend,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
}

impl ChatResponse {
    pub fn from_outcome(chat_id: String, outcome: ChatOutcome) -> Self {
        Self {
            chat_id,
            reply: outcome.reply,
            citations: outcome.citations.unwrap_or_default(),
            model: outcome.model,
            cost: outcome.cost,
            tokens: outcome.tokens,
        }
    }
}
