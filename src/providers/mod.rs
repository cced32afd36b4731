//! 学术检索提供方适配器
//!
//! 每个适配器向一个厂商接口发出一次请求，把厂商 JSON 映射为 [`SearchRecord`]。
//! 非成功响应转换为错误向上传播，由聚合器负责隔离；适配器之间不做任何跨提供方归一化。

pub mod core_ac;
pub mod doaj;
pub mod openalex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::search_record::{ProviderKind, SearchRecord};

pub use core_ac::CoreProvider;
pub use doaj::DoajProvider;
pub use openalex::OpenAlexProvider;

/// 传递给适配器的分页与过滤参数
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// 不透明的过滤条件，原样转发，聚合器与适配器均不解释
    pub filters: Value,
    /// 页码（从 1 开始）
    pub page: usize,
    pub page_size: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            filters: Value::Object(Default::default()),
            page: 1,
            page_size: 20,
        }
    }
}

/// 检索提供方适配器
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// 是否具备调用所需的配置（如 API 密钥）
    fn is_configured(&self) -> bool;

    async fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<SearchRecord>>;
}

/// 厂商 ID 可能是字符串或数字
pub(crate) fn opaque_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 去掉空白作者名
pub(crate) fn non_empty_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    names
        .into_iter()
        .flatten()
        .filter(|name| !name.trim().is_empty())
        .collect()
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
