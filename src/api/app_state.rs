use crate::observability::AppMetrics;
use crate::services::{ChatRouter, SearchAggregator};
use std::sync::Arc;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Routes chat messages between the local and remote model
    pub chat_router: Arc<ChatRouter>,
    /// Fans search queries out to the academic providers
    pub search_aggregator: Arc<SearchAggregator>,
    pub metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("chat_router", &self.chat_router)
            .field("search_aggregator", &self.search_aggregator)
            .field("metrics", &"Arc<AppMetrics>")
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(
        chat_router: ChatRouter,
        search_aggregator: SearchAggregator,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            chat_router: Arc::new(chat_router),
            search_aggregator: Arc::new(search_aggregator),
            metrics,
        }
    }
}
