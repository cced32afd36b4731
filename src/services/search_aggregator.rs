//! 学术检索聚合服务
//!
//! 并发调用选中的提供方，等待全部结束后合并、去重、排序、分页。
//! 单个提供方失败只记录日志，不影响其余结果。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::models::search_record::{ProviderKind, SearchRecord, SourcedRecord};
use crate::observability::AppMetrics;
use crate::providers::{CoreProvider, DoajProvider, OpenAlexProvider, SearchParams, SearchProvider};

/// 分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 页码（从 1 开始）
    pub page: usize,
    /// 每页数量
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

impl Pagination {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// 计算偏移量；溢出时饱和到 `usize::MAX`，对应空页
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// 缺失或非正的页码取 1；缺失或为 0 的页大小取默认值，并截断到上限
    pub fn normalize(
        page: Option<i64>,
        page_size: Option<i64>,
        default_page_size: usize,
        max_page_size: usize,
    ) -> Self {
        let page = match page {
            Some(p) if p > 0 => p as usize,
            _ => 1,
        };
        let page_size = match page_size {
            Some(s) if s > 0 => s as usize,
            _ => default_page_size,
        };

        Self {
            page,
            page_size: page_size.min(max_page_size).max(1),
        }
    }

    /// 截取当前页；越界时返回空
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size)
            .collect()
    }
}

/// 检索范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    All,
    Only(ProviderKind),
    /// 未识别的取值，不调用任何提供方
    Unmatched,
}

impl SearchScope {
    /// 缺失时为 `All`；大小写敏感
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("all") => SearchScope::All,
            Some(key) => ProviderKind::from_scope_key(key)
                .map(SearchScope::Only)
                .unwrap_or(SearchScope::Unmatched),
        }
    }

    pub fn includes(&self, kind: ProviderKind) -> bool {
        match self {
            SearchScope::All => true,
            SearchScope::Only(only) => *only == kind,
            SearchScope::Unmatched => false,
        }
    }
}

/// 聚合检索请求
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub scope: SearchScope,
    pub filters: Value,
    pub pagination: Pagination,
}

/// 一页聚合结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub query: String,
    /// 去重后的总数，而非本页条数
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub results: Vec<SourcedRecord>,
}

/// 单个提供方的调用结果
#[derive(Debug)]
pub enum ProviderOutcome {
    Success {
        kind: ProviderKind,
        records: Vec<SearchRecord>,
    },
    Failure {
        kind: ProviderKind,
        error: AppError,
    },
}

/// 检索聚合器
pub struct SearchAggregator {
    providers: Vec<Arc<dyn SearchProvider>>,
    default_page_size: usize,
    max_page_size: usize,
    metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for SearchAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<ProviderKind> = self.providers.iter().map(|p| p.kind()).collect();
        f.debug_struct("SearchAggregator")
            .field("providers", &kinds)
            .field("default_page_size", &self.default_page_size)
            .field("max_page_size", &self.max_page_size)
            .finish()
    }
}

impl SearchAggregator {
    /// `providers` 的顺序即调用顺序，也决定去重时谁先被保留
    pub fn new(
        providers: Vec<Arc<dyn SearchProvider>>,
        default_page_size: usize,
        max_page_size: usize,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            providers,
            default_page_size,
            max_page_size,
            metrics,
        }
    }

    /// 按本聚合器的默认值与上限规整请求中的分页参数
    pub fn pagination(&self, page: Option<i64>, page_size: Option<i64>) -> Pagination {
        Pagination::normalize(page, page_size, self.default_page_size, self.max_page_size)
    }

    /// 各提供方是否已注册且具备调用条件，按 scope 名称索引
    pub fn provider_status(&self) -> Vec<(ProviderKind, bool)> {
        ProviderKind::ALL
            .into_iter()
            .map(|kind| {
                let ready = self
                    .providers
                    .iter()
                    .any(|p| p.kind() == kind && p.is_configured());
                (kind, ready)
            })
            .collect()
    }

    pub async fn search(&self, request: SearchQuery) -> Result<SearchPage> {
        let query = request.query.trim().to_string();
        if query.is_empty() {
            return Err(AppError::Validation("Query is required".to_string()));
        }

        let start = Instant::now();
        let pagination = Pagination::new(
            request.pagination.page.max(1),
            request
                .pagination
                .page_size
                .min(self.max_page_size)
                .max(1),
        );
        let params = SearchParams {
            filters: request.filters,
            page: pagination.page,
            page_size: pagination.page_size,
        };

        let outcomes = self.fan_out(&query, request.scope, &params).await;
        let merged = self.merge(outcomes);
        let mut deduped = dedupe(merged);
        sort_records(&mut deduped);

        let total = deduped.len();
        let results = pagination.slice(deduped);

        let elapsed = start.elapsed();
        self.metrics.record_search(elapsed.as_millis() as u64);
        info!(
            query = %query,
            total,
            returned = results.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Search completed"
        );

        Ok(SearchPage {
            query,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
            results,
        })
    }

    /// 并发调用选中的提供方并等待全部结束
    async fn fan_out(
        &self,
        query: &str,
        scope: SearchScope,
        params: &SearchParams,
    ) -> Vec<ProviderOutcome> {
        let selected: Vec<&Arc<dyn SearchProvider>> = self
            .providers
            .iter()
            .filter(|p| scope.includes(p.kind()))
            .collect();

        if selected.is_empty() {
            debug!(?scope, "No providers selected for scope");
        }

        join_all(selected.into_iter().map(|provider| async move {
            let kind = provider.kind();
            match provider.search(query, params).await {
                Ok(records) => ProviderOutcome::Success { kind, records },
                Err(error) => ProviderOutcome::Failure { kind, error },
            }
        }))
        .await
    }

    /// 按调用顺序拼接成功结果并标注来源，失败的提供方只记录
    fn merge(&self, outcomes: Vec<ProviderOutcome>) -> Vec<SourcedRecord> {
        let mut merged = Vec::new();
        for outcome in outcomes {
            match outcome {
                ProviderOutcome::Success { kind, records } => {
                    debug!(provider = %kind, count = records.len(), "Provider returned results");
                    merged.extend(records.into_iter().map(|r| SourcedRecord::new(r, kind)));
                }
                ProviderOutcome::Failure { kind, error } => {
                    warn!(provider = %kind, error = %error, "Provider failed");
                    self.metrics.record_provider_failure();
                }
            }
        }
        merged
    }
}

/// 按 `title||第一作者` 去重，保留最先出现的记录
pub fn dedupe(records: Vec<SourcedRecord>) -> Vec<SourcedRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.record.dedupe_key()))
        .collect()
}

/// 相关度降序，其次发表日期降序；稳定排序
pub fn sort_records(records: &mut [SourcedRecord]) {
    records.sort_by(|a, b| {
        b.record
            .relevance_score
            .cmp(&a.record.relevance_score)
            .then_with(|| {
                date_millis(b.record.publish_date.as_deref())
                    .cmp(&date_millis(a.record.publish_date.as_deref()))
            })
    });
}

/// 把提供方的日期字符串转换为毫秒时间戳，无法解析时为 0
///
/// 支持 RFC 3339、`YYYY-MM-DD`、`YYYY-MM` 与纯年份。
pub fn date_millis(value: Option<&str>) -> i64 {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok())
        .or_else(|| {
            raw.parse::<i32>()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        });

    date.and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// 根据配置创建三个提供方，顺序为 OpenAlex、DOAJ、CORE
pub fn create_search_providers(config: &AppConfig) -> Result<Vec<Arc<dyn SearchProvider>>> {
    let timeout = Duration::from_secs(config.search.timeout_secs);
    let core = CoreProvider::new(&config.search.core, timeout)?;
    if !core.is_configured() {
        warn!("CORE API key not configured; CORE will return no results");
    }

    Ok(vec![
        Arc::new(OpenAlexProvider::new(&config.search.openalex, timeout)?),
        Arc::new(DoajProvider::new(&config.search.doaj, timeout)?),
        Arc::new(core),
    ])
}

/// 根据配置创建检索聚合器
pub fn create_search_aggregator(
    config: &AppConfig,
    metrics: Arc<AppMetrics>,
) -> Result<SearchAggregator> {
    Ok(SearchAggregator::new(
        create_search_providers(config)?,
        config.search.default_page_size,
        config.search.max_page_size,
        metrics,
    ))
}
