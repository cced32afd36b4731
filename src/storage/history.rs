//! 会话历史存储

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;

use crate::error::Result;
use crate::models::chat::ChatMessage;

/// 会话历史存储 trait
///
/// 以会话 ID 为键保存有序消息列表。会话在首次写入时惰性创建，不过期、不持久化。
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// 读取最近 `limit` 条消息（按时间顺序），会话不存在时返回空列表
    async fn recent(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>>;

    /// 追加消息，超出容量时丢弃最早的消息
    async fn append(&self, session_id: &str, messages: Vec<ChatMessage>) -> Result<()>;

    /// 已有历史记录的会话数量
    async fn session_count(&self) -> Result<usize>;
}

/// 进程内历史存储
///
/// 同一会话的并发读写之间没有原子性保证：一次读取可能看不到另一请求尚未完成的追加。
pub struct InMemoryHistoryStore {
    sessions: DashMap<String, VecDeque<ChatMessage>>,
    max_entries: usize,
}

impl InMemoryHistoryStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn recent(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        let Some(history) = self.sessions.get(session_id) else {
            return Ok(Vec::new());
        };

        let skip = history.len().saturating_sub(limit);
        Ok(history.iter().skip(skip).cloned().collect())
    }

    async fn append(&self, session_id: &str, messages: Vec<ChatMessage>) -> Result<()> {
        let mut history = self.sessions.entry(session_id.to_string()).or_default();
        history.extend(messages);
        while history.len() > self.max_entries {
            history.pop_front();
        }
        Ok(())
    }

    async fn session_count(&self) -> Result<usize> {
        Ok(self.sessions.len())
    }
}
