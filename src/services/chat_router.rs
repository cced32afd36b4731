//! 对话路由服务
//!
//! 先由分类器选出首选后端，失败时改用另一个后端重试一次。回退只有一跳：
//! 第二次调用失败即整体失败，不会再折返。

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::llm::{DeepSeekClient, LocalModelClient, OllamaClient, RemoteModelClient};
use crate::models::chat::{ChatMessage, ChatMode, ModelBackend};
use crate::observability::AppMetrics;
use crate::services::citations::extract_citations;
use crate::services::classifier::{RouteTarget, RoutingDecision, classify};
use crate::storage::{HistoryStore, InMemoryHistoryStore};

/// 健康自检时发送的固定消息
pub const PROBE_MESSAGE: &str = "Hello, are you working?";

/// 一次对话请求的上下文
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub session_id: String,
    /// 用户上传的文档名，只影响提示词与路由，内容不会被读取
    pub documents: Vec<String>,
    pub mode: ChatMode,
}

/// 路由结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOutcome {
    pub reply: String,
    /// 实际产生回复的后端，回退时与分类结果不同
    pub model: ModelBackend,
    pub cost: f64,
    pub citations: Option<Vec<String>>,
    pub tokens: Option<u64>,
    pub decision: RoutingDecision,
    pub fell_back: bool,
}

/// 单个后端的应答
#[derive(Debug)]
struct BackendReply {
    reply: String,
    cost: f64,
    citations: Option<Vec<String>>,
    tokens: Option<u64>,
}

pub struct ChatRouter {
    local: Arc<dyn LocalModelClient>,
    remote: Arc<dyn RemoteModelClient>,
    history: Arc<dyn HistoryStore>,
    history_window: usize,
    cost_per_token: f64,
    metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for ChatRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRouter")
            .field("local_model", &self.local.model_name())
            .field("remote_model", &self.remote.model_name())
            .field("history_window", &self.history_window)
            .field("cost_per_token", &self.cost_per_token)
            .finish()
    }
}

impl ChatRouter {
    pub fn new(
        local: Arc<dyn LocalModelClient>,
        remote: Arc<dyn RemoteModelClient>,
        history: Arc<dyn HistoryStore>,
        history_window: usize,
        cost_per_token: f64,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            local,
            remote,
            history,
            history_window,
            cost_per_token,
            metrics,
        }
    }

    pub fn local_model_name(&self) -> String {
        self.local.model_name()
    }

    pub fn remote_model_name(&self) -> String {
        self.remote.model_name()
    }

    /// 已有历史记录的会话数
    pub async fn session_count(&self) -> Result<usize> {
        self.history.session_count().await
    }

    /// 分类、调用首选后端，失败时回退一次
    pub async fn route(&self, message: &str, context: &ChatContext) -> Result<ChatOutcome> {
        let decision = classify(message, !context.documents.is_empty(), context.mode);
        let primary = match decision.target {
            RouteTarget::Local => ModelBackend::Local,
            RouteTarget::Remote => ModelBackend::DeepSeek,
        };
        debug!(
            session_id = %context.session_id,
            backend = %primary,
            reason = ?decision.reason,
            "Routing chat message"
        );

        let (model, reply, fell_back) = match self.dispatch(primary, message, context).await {
            Ok(reply) => (primary, reply, false),
            Err(primary_err) => {
                let fallback = primary.other();
                warn!(
                    session_id = %context.session_id,
                    failed = %primary,
                    fallback = %fallback,
                    error = %primary_err,
                    "Model backend failed, falling back"
                );

                match self.dispatch(fallback, message, context).await {
                    Ok(reply) => (fallback, reply, true),
                    Err(fallback_err) => {
                        error!(
                            session_id = %context.session_id,
                            primary_error = %primary_err,
                            fallback_error = %fallback_err,
                            "Both model backends failed"
                        );
                        self.metrics.record_chat_failure();
                        return Err(AppError::ChatFailed(fallback_err.to_string()));
                    }
                }
            }
        };

        self.metrics.record_chat(model, fell_back);
        info!(
            session_id = %context.session_id,
            model = %model,
            fell_back,
            "Chat reply generated"
        );

        Ok(ChatOutcome {
            reply: reply.reply,
            model,
            cost: reply.cost,
            citations: reply.citations,
            tokens: reply.tokens,
            decision,
            fell_back,
        })
    }

    /// 直接调用指定后端，不回退、不读写历史
    pub async fn probe(&self, backend: ModelBackend) -> Result<String> {
        match backend {
            ModelBackend::Local => self.local.generate(PROBE_MESSAGE).await,
            ModelBackend::DeepSeek => {
                let completion = self
                    .remote
                    .chat(&[ChatMessage::user(PROBE_MESSAGE)])
                    .await?;
                Ok(completion.content)
            }
        }
    }

    async fn dispatch(
        &self,
        backend: ModelBackend,
        message: &str,
        context: &ChatContext,
    ) -> Result<BackendReply> {
        match backend {
            ModelBackend::Local => self.ask_local(message, context).await,
            ModelBackend::DeepSeek => self.ask_remote(message, context).await,
        }
    }

    async fn ask_local(&self, message: &str, context: &ChatContext) -> Result<BackendReply> {
        let prompt = format_local_prompt(message, &context.documents);
        let reply = self.local.generate(&prompt).await?;

        Ok(BackendReply {
            reply,
            cost: 0.0,
            citations: None,
            tokens: None,
        })
    }

    async fn ask_remote(&self, message: &str, context: &ChatContext) -> Result<BackendReply> {
        let recent = self
            .history
            .recent(&context.session_id, self.history_window)
            .await?;

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ChatMessage::system(system_prompt(context)));
        messages.extend(recent);
        messages.push(ChatMessage::user(message));

        let completion = self.remote.chat(&messages).await?;

        // 仅在远程成功后写入，失败的尝试不计入 /ai/stats 的会话数
        self.history
            .append(
                &context.session_id,
                vec![
                    ChatMessage::user(message),
                    ChatMessage::assistant(completion.content.clone()),
                ],
            )
            .await?;

        Ok(BackendReply {
            citations: extract_citations(&completion.content),
            cost: completion.total_tokens as f64 * self.cost_per_token,
            tokens: Some(completion.total_tokens),
            reply: completion.content,
        })
    }
}

/// 本地模型提示词：有附件时带上文件名
pub fn format_local_prompt(message: &str, documents: &[String]) -> String {
    if documents.is_empty() {
        message.to_string()
    } else {
        format!(
            "User has uploaded: {}\n\nQuestion: {}",
            documents.join(", "),
            message
        )
    }
}

/// 远程模型的系统提示词
pub fn system_prompt(context: &ChatContext) -> String {
    let mut prompt = String::from("You are Semantix AI, a research assistant.");

    if !context.documents.is_empty() {
        prompt.push_str(&format!(
            " The user has these documents: {}. Consider them in your response.",
            context.documents.join(", ")
        ));
    }

    if context.mode == ChatMode::Online {
        prompt.push_str(" Provide up-to-date information with citations.");
    }

    prompt.push_str(" Be accurate and helpful for academic research.");
    prompt
}

/// 根据配置创建对话路由
pub fn create_chat_router(config: &AppConfig, metrics: Arc<AppMetrics>) -> Result<ChatRouter> {
    let local = OllamaClient::new(&config.local_model)?;
    let remote = DeepSeekClient::new(&config.remote_model)?;
    if !remote.is_configured() {
        warn!("DeepSeek API key not configured; remote requests will fall back to the local model");
    }

    Ok(ChatRouter::new(
        Arc::new(local),
        Arc::new(remote),
        Arc::new(InMemoryHistoryStore::new(config.history.max_entries)),
        config.history.window,
        config.remote_model.cost_per_token,
        metrics,
    ))
}
