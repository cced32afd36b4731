//! DOAJ 适配器
//!
//! https://doaj.org/api/v2/search/articles?q=...

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::config::DoajConfig;
use crate::error::{AppError, Result};
use crate::models::search_record::{ProviderKind, SearchRecord};
use crate::providers::{SearchParams, SearchProvider, non_empty, non_empty_names, opaque_id};

const MAX_PER_PAGE: usize = 100;

pub struct DoajProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    results: Option<Vec<Article>>,
}

#[derive(Debug, Deserialize)]
struct Article {
    id: Option<Value>,
    title: Option<String>,
    bibjson: Option<BibJson>,
}

#[derive(Debug, Default, Deserialize)]
struct BibJson {
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    author: Option<Vec<BibAuthor>>,
    link: Option<Vec<BibLink>>,
    /// DOAJ 以字符串返回年份，偶见数字
    year: Option<Value>,
    #[serde(rename = "type")]
    bib_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BibAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BibLink {
    url: Option<String>,
}

impl DoajProvider {
    pub fn new(config: &DoajConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn articles_url(&self, query: &str, params: &SearchParams) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&format!("{}/search/articles", self.base_url))
            .map_err(|e| AppError::Config(format!("invalid DOAJ base URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("page", &params.page.to_string())
            .append_pair("pageSize", &params.page_size.min(MAX_PER_PAGE).to_string());
        Ok(url)
    }
}

#[async_trait]
impl SearchProvider for DoajProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Doaj
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<SearchRecord>> {
        let url = self.articles_url(query, params)?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "DOAJ error: {}",
                response.status()
            )));
        }

        let body: ArticlesResponse = response.json().await?;
        Ok(body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(into_record)
            .collect())
    }
}

fn year_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn into_record(article: Article) -> SearchRecord {
    let id = opaque_id(article.id.as_ref());
    let bib = article.bibjson.unwrap_or_default();

    let title = non_empty(bib.title).or(article.title).unwrap_or_default();
    let abstract_text = bib.abstract_text.unwrap_or_default();
    let preview = if abstract_text.is_empty() {
        title.clone()
    } else {
        abstract_text.clone()
    };
    let authors = non_empty_names(bib.author.unwrap_or_default().into_iter().map(|a| a.name));
    let url = bib
        .link
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|link| non_empty(link.url))
        .or_else(|| id.clone());

    SearchRecord {
        id,
        title,
        abstract_text,
        preview,
        url,
        authors,
        publish_date: year_string(bib.year),
        record_type: non_empty(bib.bib_type).unwrap_or_else(|| SearchRecord::DEFAULT_TYPE.into()),
        relevance_score: rand::thread_rng().gen_range(60..100),
    }
}
