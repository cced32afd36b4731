//! CORE 适配器
//!
//! https://api.core.ac.uk/v3/search/works?query=...，需要 Bearer API 密钥。

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use crate::config::config::CoreConfig;
use crate::error::{AppError, Result};
use crate::models::search_record::{ProviderKind, SearchRecord, clamp_relevance};
use crate::providers::{SearchParams, SearchProvider, non_empty, non_empty_names, opaque_id};

const MAX_PER_PAGE: usize = 50;

pub struct CoreProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct WorksResponse {
    results: Option<Vec<Work>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Work {
    id: Option<Value>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    excerpt: Option<String>,
    authors: Option<Vec<CoreAuthor>>,
    source_url: Option<String>,
    download_url: Option<String>,
    url: Option<String>,
    published: Option<String>,
    #[serde(rename = "type")]
    work_type: Option<String>,
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CoreAuthor {
    name: Option<String>,
}

impl CoreProvider {
    pub fn new(config: &CoreConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
        })
    }

    fn works_url(&self, query: &str, params: &SearchParams) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&format!("{}/search/works", self.base_url))
            .map_err(|e| AppError::Config(format!("invalid CORE base URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("page", &params.page.to_string())
            .append_pair("pageSize", &params.page_size.min(MAX_PER_PAGE).to_string());
        Ok(url)
    }
}

#[async_trait]
impl SearchProvider for CoreProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Core
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<SearchRecord>> {
        if !self.is_configured() {
            warn!("CORE API key not provided; skipping CORE search");
            return Ok(Vec::new());
        }

        let url = self.works_url(query, params)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "CORE error: {}",
                response.status()
            )));
        }

        let body: WorksResponse = response.json().await?;
        Ok(body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(into_record)
            .collect())
    }
}

fn into_record(work: Work) -> SearchRecord {
    let title = work.title.unwrap_or_default();
    let abstract_text = work.abstract_text.unwrap_or_default();
    let preview = non_empty(work.excerpt)
        .or_else(|| non_empty(Some(abstract_text.clone())))
        .unwrap_or_else(|| title.clone());
    let authors = non_empty_names(work.authors.unwrap_or_default().into_iter().map(|a| a.name));
    let url = non_empty(work.source_url)
        .or(non_empty(work.download_url))
        .or(non_empty(work.url));
    let relevance_score = match work.score {
        Some(score) if score != 0.0 => clamp_relevance(score * 10.0),
        _ => rand::thread_rng().gen_range(60..100),
    };

    SearchRecord {
        id: opaque_id(work.id.as_ref()),
        title,
        abstract_text,
        preview,
        url,
        authors,
        publish_date: non_empty(work.published),
        record_type: non_empty(work.work_type).unwrap_or_else(|| SearchRecord::DEFAULT_TYPE.into()),
        relevance_score,
    }
}
