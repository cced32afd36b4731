//! 服务模块

pub mod chat_router;
pub mod citations;
pub mod classifier;
pub mod search_aggregator;

pub use chat_router::{ChatContext, ChatOutcome, ChatRouter, create_chat_router};
pub use citations::extract_citations;
pub use classifier::{RouteTarget, RoutingDecision, RoutingReason, classify};
pub use search_aggregator::{
    Pagination, SearchAggregator, SearchPage, SearchQuery, SearchScope, create_search_aggregator,
};
