//! 回复文本中的引用提取

use once_cell::sync::Lazy;
use regex::Regex;

/// 最多返回的引用条数
pub const MAX_CITATIONS: usize = 3;

/// `[n]` 形式的编号引用
static NUMERIC_CITATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("numeric citation pattern must compile"));

/// `(作者 et al., 年份)` 一类的括号引用
static PARENTHETICAL_CITATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((?:[^)]+?\s*)?(?:et al\.)?\s*(?:,?\s*\d{4})?\)")
        .expect("parenthetical citation pattern must compile")
});

/// 先收集全部编号引用，再收集括号引用，合计取前三条；一条都没有时返回 `None`
pub fn extract_citations(text: &str) -> Option<Vec<String>> {
    let citations: Vec<String> = NUMERIC_CITATION
        .find_iter(text)
        .chain(PARENTHETICAL_CITATION.find_iter(text))
        .take(MAX_CITATIONS)
        .map(|m| m.as_str().to_string())
        .collect();

    if citations.is_empty() {
        None
    } else {
        Some(citations)
    }
}
