use axum::{Json, extract::State, extract::rejection::JsonRejection, response::IntoResponse};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::search_dto::*, handlers::json_body},
    error::AppError,
    models::search_record::ProviderKind,
    services::{SearchQuery, SearchScope},
};

pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(payload)?;

    let query = request.query_text();
    if query.is_empty() {
        return Err(AppError::Validation("Query is required".to_string()));
    }

    let scope = SearchScope::parse(request.scope.as_deref());
    let pagination = state
        .search_aggregator
        .pagination(request.page_number(), request.page_size_number());
    debug!("Search: {}, scope: {:?}, page: {:?}", query, scope, pagination);

    let page = state
        .search_aggregator
        .search(SearchQuery {
            query,
            scope,
            filters: request.filters(),
            pagination,
        })
        .await?;

    Ok(Json(page))
}

pub async fn search_health(State(state): State<AppState>) -> impl IntoResponse {
    let mut providers = ProviderFlags::default();
    for (kind, ready) in state.search_aggregator.provider_status() {
        match kind {
            ProviderKind::OpenAlex => providers.openalex = ready,
            ProviderKind::Doaj => providers.doaj = ready,
            ProviderKind::Core => providers.core = ready,
        }
    }

    Json(SearchHealthResponse {
        status: "ok".to_string(),
        providers,
    })
}
