//! Semantix - 研究助手后端
//!
//! 在本地 Ollama 模型与托管的 DeepSeek 模型之间路由对话消息（失败时单跳回退），
//! 并把学术检索请求并发分发到 OpenAlex、DOAJ、CORE，合并、去重、排序后分页返回。

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod observability;
pub mod providers;
pub mod security;
pub mod services;
pub mod storage;
