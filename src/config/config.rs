use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

/// 本地模型（Ollama）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalModelConfig {
    /// Ollama 服务器地址
    pub base_url: String,
    /// 快速本地模型名称
    pub model: String,
    /// 采样温度
    pub temperature: f32,
    /// 最大生成 token 数
    pub num_predict: u32,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "phi:2.7b".into(),
            temperature: 0.7,
            num_predict: 512,
            timeout_secs: 60,
        }
    }
}

/// 远程模型（DeepSeek 兼容的 chat completions 接口）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteModelConfig {
    /// chat completions 完整地址
    pub endpoint: String,
    /// API 密钥，为空时远程调用直接失败并回退到本地模型
    pub api_key: String,
    /// 模型名称
    pub model: String,
    /// 最大生成 token 数
    pub max_tokens: u32,
    /// 采样温度
    pub temperature: f32,
    /// 每 token 成本（美元）
    pub cost_per_token: f64,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for RemoteModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.deepseek.com/v1/chat/completions".into(),
            api_key: String::new(),
            model: "deepseek-chat".into(),
            max_tokens: 2000,
            temperature: 0.7,
            cost_per_token: 0.000_000_14,
            timeout_secs: 60,
        }
    }
}

/// 会话历史配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// 每次远程调用读取的最近消息数
    pub window: usize,
    /// 每个会话最多保留的消息数（写入时截断）
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window: 6,
            max_entries: 64,
        }
    }
}

/// OpenAlex 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAlexConfig {
    pub base_url: String,
    /// OpenAlex 要求携带可识别的 User-Agent
    pub user_agent: String,
}

impl Default for OpenAlexConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openalex.org".into(),
            user_agent: "Semantix/1.0 (mailto:your-email@example.com)".into(),
        }
    }
}

/// DOAJ 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DoajConfig {
    pub base_url: String,
}

impl Default for DoajConfig {
    fn default() -> Self {
        Self {
            base_url: "https://doaj.org/api/v2".into(),
        }
    }
}

/// CORE 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub base_url: String,
    /// API 密钥，为空时跳过 CORE 检索
    pub api_key: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.core.ac.uk/v3".into(),
            api_key: String::new(),
        }
    }
}

/// 学术检索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 默认每页数量
    pub default_page_size: usize,
    /// 每页数量上限
    pub max_page_size: usize,
    /// 单个提供方请求超时（秒）
    pub timeout_secs: u64,
    pub openalex: OpenAlexConfig,
    pub doaj: DoajConfig,
    pub core: CoreConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 50,
            timeout_secs: 30,
            openalex: OpenAlexConfig::default(),
            doaj: DoajConfig::default(),
            core: CoreConfig::default(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
    /// 日志文件目录，设置后按天滚动写入文件
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            structured: false,
            log_dir: None,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 本地模型配置
    pub local_model: LocalModelConfig,
    /// 远程模型配置
    pub remote_model: RemoteModelConfig,
    /// 会话历史配置
    pub history: HistoryConfig,
    /// 学术检索配置
    pub search: SearchConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            local_model: LocalModelConfig::default(),
            remote_model: RemoteModelConfig::default(),
            history: HistoryConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
            app_name: "semantix".into(),
            environment: "development".into(),
        }
    }
}

impl AppConfig {
    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::default();
        config.environment = "production".into();
        config.logging.structured = true;
        config
    }
}
