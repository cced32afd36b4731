use serde::{Deserialize, Serialize};
use std::fmt;

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// 对话消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// 对话模式
///
/// 只有 `Online` 会影响路由；`Document` 与 `Normal` 行为一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    #[default]
    Normal,
    Online,
    Document,
}

impl ChatMode {
    /// 未知或缺失的取值按 `Normal` 处理
    pub fn parse_lossy(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("online") => ChatMode::Online,
            Some("document") => ChatMode::Document,
            _ => ChatMode::Normal,
        }
    }
}

/// 实际产生回复的模型后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelBackend {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "deepseek")]
    DeepSeek,
}

impl ModelBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelBackend::Local => "local",
            ModelBackend::DeepSeek => "deepseek",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "local" => Some(ModelBackend::Local),
            "deepseek" => Some(ModelBackend::DeepSeek),
            _ => None,
        }
    }

    /// 回退时使用的另一个后端
    pub fn other(&self) -> Self {
        match self {
            ModelBackend::Local => ModelBackend::DeepSeek,
            ModelBackend::DeepSeek => ModelBackend::Local,
        }
    }
}

impl fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
