use axum::{Json, extract::State, extract::rejection::JsonRejection, response::IntoResponse};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    api::{app_state::AppState, dto::model_dto::*, handlers::json_body},
    error::AppError,
    models::chat::ModelBackend,
};

pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sessions = state.chat_router.session_count().await?;

    Ok(Json(StatsResponse {
        status: "active".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        models: ModelNames {
            local: state.chat_router.local_model_name(),
            cloud: state.chat_router.remote_model_name(),
        },
        sessions,
    }))
}

pub async fn test_model(
    State(state): State<AppState>,
    payload: Result<Json<TestModelRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(payload)?;

    let backend = request
        .model
        .as_deref()
        .and_then(ModelBackend::parse)
        .ok_or_else(|| AppError::Validation("Invalid model specified".to_string()))?;

    info!("Testing model backend: {}", backend);
    let response = state.chat_router.probe(backend).await.map_err(|e| {
        warn!("Model test failed for {}: {}", backend, e);
        e
    })?;

    Ok(Json(TestModelResponse {
        status: "success".to_string(),
        model: backend,
        response,
    }))
}
