//! 模型状态 DTO

use serde::{Deserialize, Serialize};

use crate::models::chat::ModelBackend;

/// 已配置的模型名称
#[derive(Debug, Serialize)]
pub struct ModelNames {
    pub local: String,
    pub cloud: String,
}

/// 模型状态响应
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub status: String,
    pub timestamp: String,
    pub models: ModelNames,
    /// 已有历史记录的会话数
    pub sessions: usize,
}

/// 模型自检请求
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestModelRequest {
    /// local / deepseek
    pub model: Option<String>,
}

/// 模型自检响应
#[derive(Debug, Serialize)]
pub struct TestModelResponse {
    pub status: String,
    pub model: ModelBackend,
    pub response: String,
}
