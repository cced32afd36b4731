use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use std::path::{Path, PathBuf};

/// 旧版扁平环境变量到配置路径的映射
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("OLLAMA_BASE_URL", "local_model.base_url"),
    ("LOCAL_FAST_MODEL", "local_model.model"),
    ("DEEPSEEK_API_KEY", "remote_model.api_key"),
    ("DEEPSEEK_API_URL", "remote_model.endpoint"),
    ("DEEPSEEK_COST_PER_TOKEN", "remote_model.cost_per_token"),
    ("CORE_API_KEY", "search.core.api_key"),
    ("PORT", "server.port"),
];

fn legacy_path(key: &str) -> Option<&'static str> {
    LEGACY_ENV_KEYS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, path)| *path)
}

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 优先级（后者覆盖前者）：
    /// 1. 内置默认值
    /// 2. ./config.yaml
    /// 3. `SEMANTIX_` 前缀环境变量，嵌套字段用 `__` 分隔（如 `SEMANTIX_LOCAL_MODEL__BASE_URL`）
    /// 4. 旧版环境变量（`OLLAMA_BASE_URL`、`DEEPSEEK_API_KEY` 等）
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::figment(&default_config_path()).extract()
    }

    /// 从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig, figment::Error> {
        Self::figment(&path).extract()
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("SEMANTIX_").split("__"))
            .merge(
                Env::raw()
                    .filter(|key| legacy_path(key.as_str()).is_some())
                    .map(|key| match legacy_path(key.as_str()) {
                        Some(path) => path.to_string().into(),
                        None => key.as_str().to_string().into(),
                    }),
            )
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.local_model.model.trim().is_empty() {
            return Err(ConfigValidationError::MissingModel("local_model.model"));
        }

        if config.remote_model.model.trim().is_empty() {
            return Err(ConfigValidationError::MissingModel("remote_model.model"));
        }

        if config.remote_model.cost_per_token < 0.0 {
            return Err(ConfigValidationError::NegativeCost);
        }

        if config.history.window == 0 || config.history.max_entries < config.history.window {
            return Err(ConfigValidationError::InvalidHistory {
                window: config.history.window,
                max_entries: config.history.max_entries,
            });
        }

        if config.search.default_page_size == 0 || config.search.max_page_size == 0 {
            return Err(ConfigValidationError::InvalidPageSize);
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("模型名称未配置: {0}")]
    MissingModel(&'static str),

    #[error("每 token 成本不能为负数")]
    NegativeCost,

    #[error("历史窗口无效: window={window}, max_entries={max_entries}")]
    InvalidHistory { window: usize, max_entries: usize },

    #[error("分页大小无效，必须大于 0")]
    InvalidPageSize,
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.yaml")
}

/// 检查配置文件是否存在
pub fn config_exists() -> bool {
    default_config_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(ConfigLoader::validate(&config).is_ok());
        assert_eq!(config.local_model.base_url, "http://localhost:11434");
        assert_eq!(config.local_model.model, "phi:2.7b");
        assert_eq!(config.remote_model.model, "deepseek-chat");
        assert_eq!(config.history.window, 6);
        assert_eq!(config.search.max_page_size, 50);
    }

    #[test]
    fn test_legacy_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("OLLAMA_BASE_URL", "http://gpu-box:11434");
            jail.set_env("LOCAL_FAST_MODEL", "llama3.2:1b");
            jail.set_env("DEEPSEEK_API_KEY", "sk-test");
            jail.set_env("CORE_API_KEY", "core-key");

            let config = ConfigLoader::load().expect("config loads");
            assert_eq!(config.local_model.base_url, "http://gpu-box:11434");
            assert_eq!(config.local_model.model, "llama3.2:1b");
            assert_eq!(config.remote_model.api_key, "sk-test");
            assert_eq!(config.search.core.api_key, "core-key");
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_and_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                "history:\n  window: 4\nsearch:\n  default_page_size: 10\n",
            )?;
            jail.set_env("SEMANTIX_REMOTE_MODEL__COST_PER_TOKEN", "0.000001");
            jail.set_env("SEMANTIX_SERVER__HOST", "127.0.0.1");

            let config = ConfigLoader::load().expect("config loads");
            assert_eq!(config.history.window, 4);
            assert_eq!(config.history.max_entries, 64);
            assert_eq!(config.search.default_page_size, 10);
            assert_eq!(config.server.host, "127.0.0.1");
            assert!((config.remote_model.cost_per_token - 0.000001).abs() < f64::EPSILON);
            Ok(())
        });
    }

    #[test]
    fn test_validate_rejects_bad_history() {
        let mut config = AppConfig::default();
        config.history.window = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidHistory { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_cost() {
        let mut config = AppConfig::default();
        config.remote_model.cost_per_token = -1.0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::NegativeCost)
        ));
    }
}
