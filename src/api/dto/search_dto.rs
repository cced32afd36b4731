//! 搜索 DTO
//!
//! 定义学术检索相关的请求和响应数据结构。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 检索请求
///
/// `query`、`page`、`pageSize` 保持原始 JSON，类型不符时按缺失处理，
/// 而不是让整个请求体反序列化失败。
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: Option<Value>,
    /// all / openalex / doaj / core
    pub scope: Option<String>,
    /// 原样转发给提供方
    pub filters: Option<Value>,
    pub page: Option<Value>,
    pub page_size: Option<Value>,
}

impl SearchRequest {
    /// 非字符串查询视为空
    pub fn query_text(&self) -> String {
        match &self.query {
            Some(Value::String(s)) => s.trim().to_string(),
            _ => String::new(),
        }
    }

    pub fn filters(&self) -> Value {
        match &self.filters {
            Some(v @ Value::Object(_)) => v.clone(),
            _ => Value::Object(Default::default()),
        }
    }

    pub fn page_number(&self) -> Option<i64> {
        loose_integer(self.page.as_ref())
    }

    pub fn page_size_number(&self) -> Option<i64> {
        loose_integer(self.page_size.as_ref())
    }
}

/// 接受数字或数字字符串，小数向零取整
fn loose_integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// 提供方可用性
#[derive(Debug, Default, Serialize)]
pub struct ProviderFlags {
    pub openalex: bool,
    pub doaj: bool,
    pub core: bool,
}

/// 检索健康检查响应
#[derive(Debug, Serialize)]
pub struct SearchHealthResponse {
    pub status: String,
    pub providers: ProviderFlags,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_and_numeric_strings() {
        let request: SearchRequest = serde_json::from_value(json!({
            "query": "  graphene ",
            "page": "2",
            "pageSize": 10.7
        }))
        .unwrap();

        assert_eq!(request.query_text(), "graphene");
        assert_eq!(request.page_number(), Some(2));
        assert_eq!(request.page_size_number(), Some(10));
    }

    #[test]
    fn test_wrong_types_are_treated_as_missing() {
        let request: SearchRequest = serde_json::from_value(json!({
            "query": 42,
            "page": "abc",
            "pageSize": [1],
            "filters": "none"
        }))
        .unwrap();

        assert_eq!(request.query_text(), "");
        assert_eq!(request.page_number(), None);
        assert_eq!(request.page_size_number(), None);
        assert_eq!(request.filters(), json!({}));
    }

    #[test]
    fn test_filters_pass_through() {
        let request: SearchRequest = serde_json::from_value(json!({
            "query": "q",
            "filters": { "duration": "past-year" }
        }))
        .unwrap();
        assert_eq!(request.filters()["duration"], "past-year");
    }
}
