use serde::{Deserialize, Serialize};
use std::fmt;

/// 学术检索提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    OpenAlex,
    Doaj,
    Core,
}

impl ProviderKind {
    /// `scope=all` 时的调用顺序，也是去重时的优先顺序
    pub const ALL: [ProviderKind; 3] = [ProviderKind::OpenAlex, ProviderKind::Doaj, ProviderKind::Core];

    /// 附加到检索结果上的来源名称
    pub fn source_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAlex => "OpenAlex",
            ProviderKind::Doaj => "DOAJ",
            ProviderKind::Core => "CORE",
        }
    }

    /// 请求中 `scope` 参数使用的名称
    pub fn scope_key(&self) -> &'static str {
        match self {
            ProviderKind::OpenAlex => "openalex",
            ProviderKind::Doaj => "doaj",
            ProviderKind::Core => "core",
        }
    }

    pub fn from_scope_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.scope_key() == key)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source_name())
    }
}

/// 归一化的检索结果
///
/// 每个适配器无论上游结构如何都返回该形状；上游缺失的字段为 null 或空值，
/// 序列化时不会省略。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    /// 提供方内部标识，不同提供方之间可能冲突
    pub id: Option<String>,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// 预览文本：摘录 → 摘要 → 标题
    pub preview: String,
    pub url: Option<String>,
    pub authors: Vec<String>,
    /// 日期格式因提供方而异（仅年份或完整日期），不做统一
    pub publish_date: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    /// 0–100，部分提供方为伪随机值，跨提供方不可比
    pub relevance_score: u8,
}

impl SearchRecord {
    pub const DEFAULT_TYPE: &'static str = "article";

    /// 去重键：`title || 第一作者`，大小写敏感的精确匹配
    pub fn dedupe_key(&self) -> String {
        let first_author = self.authors.first().map(String::as_str).unwrap_or("");
        format!("{}||{}", self.title, first_author)
    }
}

/// 将任意分数收敛到 0–100 的整数区间
pub fn clamp_relevance(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u8
}

/// 由聚合器附加来源后的检索结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcedRecord {
    #[serde(flatten)]
    pub record: SearchRecord,
    pub source: String,
}

impl SourcedRecord {
    pub fn new(record: SearchRecord, source: ProviderKind) -> Self {
        Self {
            record,
            source: source.source_name().to_string(),
        }
    }
}
