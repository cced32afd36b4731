//! 模型客户端模块
//!
//! 本地推理端点（Ollama）与托管的 chat completions 端点（DeepSeek）的薄封装。

pub mod deepseek;
pub mod ollama;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::chat::ChatMessage;

pub use deepseek::DeepSeekClient;
pub use ollama::OllamaClient;

/// 远程模型的一次补全结果
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    /// 上游报告的总 token 数，缺失时为 0
    pub total_tokens: u64,
}

/// 本地模型客户端
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalModelClient: Send + Sync {
    /// 单轮生成，不携带历史
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> String;
}

/// 远程模型客户端
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteModelClient: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Completion>;

    fn model_name(&self) -> String;
}
