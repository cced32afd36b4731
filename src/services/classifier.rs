//! 查询分类器
//!
//! 把一条消息映射为本地/远程模型的路由决策。规则按固定顺序逐条判断，第一条命中即返回，
//! 顺序本身就是行为的一部分：例如包含 "research" 的短消息必须走远程，而不是被长度规则截走。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::chat::ChatMode;

/// 低于该字符数的消息默认走本地模型
pub const LOCAL_LENGTH_THRESHOLD: usize = 200;

/// 路由目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteTarget {
    Local,
    Remote,
}

/// 路由原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingReason {
    /// 显式 online 模式
    OnlineMode,
    /// 问候、致谢、告别等简单消息
    SimplePattern,
    /// 学术词汇或附带文档
    ResearchTrigger,
    /// 短消息
    LengthThreshold,
    /// 其余情况
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoutingDecision {
    pub target: RouteTarget,
    pub reason: RoutingReason,
}

/// 分类器输入
#[derive(Debug, Clone, Copy)]
pub struct ClassifierInput<'a> {
    pub message: &'a str,
    pub has_attached_documents: bool,
    pub mode: ChatMode,
}

struct Rule {
    reason: RoutingReason,
    target: RouteTarget,
    applies: fn(&ClassifierInput<'_>) -> bool,
}

/// 锚定在开头（或整串）的简单消息模式，匹配前先去除首尾空白
static SIMPLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)^hi\b",
        r"(?i)^hello\b",
        r"(?i)^hey\b",
        r"(?i)^thanks?",
        r"(?i)^thank you",
        r"(?i)^bye\b",
        r"(?i)^goodbye",
        r"(?i)^what is your name",
        r"(?i)^who are you",
        r"(?i)^help$",
        r"^\?$",
        r"^\.\.\.$",
        r"^\.$",
    ])
});

/// 学术词汇，子串匹配
static RESEARCH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)research",
        r"(?i)study",
        r"(?i)paper",
        r"(?i)citation",
        r"(?i)reference",
        r"(?i)methodology",
        r"(?i)analysis",
        r"(?i)semantic",
        r"(?i)embedding",
        r"(?i)academic",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("built-in routing pattern must compile"))
        .collect()
}

fn is_online(input: &ClassifierInput<'_>) -> bool {
    input.mode == ChatMode::Online
}

fn is_simple(input: &ClassifierInput<'_>) -> bool {
    is_simple_query(input.message)
}

fn is_research_or_documents(input: &ClassifierInput<'_>) -> bool {
    input.has_attached_documents || is_research_query(input.message)
}

fn is_short(input: &ClassifierInput<'_>) -> bool {
    input.message.chars().count() < LOCAL_LENGTH_THRESHOLD
}

/// 自上而下求值，第一条命中即返回；全部未命中时走远程
static RULES: &[Rule] = &[
    Rule {
        reason: RoutingReason::OnlineMode,
        target: RouteTarget::Remote,
        applies: is_online,
    },
    Rule {
        reason: RoutingReason::SimplePattern,
        target: RouteTarget::Local,
        applies: is_simple,
    },
    Rule {
        reason: RoutingReason::ResearchTrigger,
        target: RouteTarget::Remote,
        applies: is_research_or_documents,
    },
    Rule {
        reason: RoutingReason::LengthThreshold,
        target: RouteTarget::Local,
        applies: is_short,
    },
];

/// 是否为问候、致谢、告别或元问题
pub fn is_simple_query(message: &str) -> bool {
    let trimmed = message.trim();
    SIMPLE_PATTERNS.iter().any(|p| p.is_match(trimmed))
}

/// 是否包含学术/研究类词汇
pub fn is_research_query(message: &str) -> bool {
    RESEARCH_PATTERNS.iter().any(|p| p.is_match(message))
}

/// 纯函数：相同输入总是得到相同决策
pub fn classify(message: &str, has_attached_documents: bool, mode: ChatMode) -> RoutingDecision {
    let input = ClassifierInput {
        message,
        has_attached_documents,
        mode,
    };

    RULES
        .iter()
        .find(|rule| (rule.applies)(&input))
        .map(|rule| RoutingDecision {
            target: rule.target,
            reason: rule.reason,
        })
        .unwrap_or(RoutingDecision {
            target: RouteTarget::Remote,
            reason: RoutingReason::Default,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hi")]
    #[case("Hi there")]
    #[case("HELLO")]
    #[case("hey, you")]
    #[case("thanks!")]
    #[case("Thank you so much")]
    #[case("bye")]
    #[case("Goodbye for now")]
    #[case("What is your name?")]
    #[case("who are you")]
    #[case("help")]
    #[case("  help  ")]
    #[case("?")]
    #[case("...")]
    #[case(".")]
    fn simple_messages_route_local(#[case] message: &str) {
        let decision = classify(message, false, ChatMode::Normal);
        assert_eq!(decision.target, RouteTarget::Local);
        assert_eq!(decision.reason, RoutingReason::SimplePattern);
    }

    #[rstest]
    #[case("high hopes")]
    #[case("help me with this")]
    #[case("??")]
    #[case("they said hi")]
    fn near_misses_are_not_simple(#[case] message: &str) {
        assert!(!is_simple_query(message));
    }

    #[rstest]
    #[case("research")]
    #[case("Any RESEARCH on bees?")]
    #[case("summarize this paper")]
    #[case("what's the methodology")]
    #[case("embedding models")]
    fn research_vocabulary_routes_remote(#[case] message: &str) {
        let decision = classify(message, false, ChatMode::Normal);
        assert_eq!(decision.target, RouteTarget::Remote);
        assert_eq!(decision.reason, RoutingReason::ResearchTrigger);
    }

    #[test]
    fn test_online_mode_overrides_simple_pattern() {
        let decision = classify("hi", false, ChatMode::Online);
        assert_eq!(decision.target, RouteTarget::Remote);
        assert_eq!(decision.reason, RoutingReason::OnlineMode);
    }

    #[test]
    fn test_simple_pattern_wins_over_research_vocabulary() {
        let decision = classify("thanks for the research tips", false, ChatMode::Normal);
        assert_eq!(decision.target, RouteTarget::Local);
    }

    #[test]
    fn test_attached_documents_route_remote() {
        let decision = classify("what does it say?", true, ChatMode::Document);
        assert_eq!(decision.target, RouteTarget::Remote);
        assert_eq!(decision.reason, RoutingReason::ResearchTrigger);
    }

    #[test]
    fn test_length_boundary() {
        let short = "a".repeat(LOCAL_LENGTH_THRESHOLD - 1);
        let decision = classify(&short, false, ChatMode::Normal);
        assert_eq!(decision.target, RouteTarget::Local);
        assert_eq!(decision.reason, RoutingReason::LengthThreshold);

        let long = "a".repeat(LOCAL_LENGTH_THRESHOLD);
        let decision = classify(&long, false, ChatMode::Normal);
        assert_eq!(decision.target, RouteTarget::Remote);
        assert_eq!(decision.reason, RoutingReason::Default);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let message = "é".repeat(150);
        assert!(message.len() > LOCAL_LENGTH_THRESHOLD);
        assert_eq!(
            classify(&message, false, ChatMode::Normal).target,
            RouteTarget::Local
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let message = "Tell me about the history of Rome";
        assert_eq!(
            classify(message, false, ChatMode::Normal),
            classify(message, false, ChatMode::Normal)
        );
    }
}
