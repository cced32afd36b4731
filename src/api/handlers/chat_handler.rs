use axum::{Json, extract::State, extract::rejection::JsonRejection, response::IntoResponse};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::chat_dto::*, handlers::json_body},
    error::AppError,
    models::chat::ChatMode,
    services::ChatContext,
};

/// 会话 ID 在日志中只保留前 8 个字符
fn short_id(chat_id: &str) -> String {
    chat_id.chars().take(8).collect()
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(payload)?;

    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Message is required".to_string()))?;
    let chat_id = request
        .chat_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Chat ID is required".to_string()))?;

    let mode = ChatMode::parse_lossy(request.mode.as_deref());
    debug!(
        "Chat request: {}..., mode: {:?}, documents: {}",
        short_id(&chat_id),
        mode,
        request.pdfs.len()
    );

    let context = ChatContext {
        session_id: chat_id.clone(),
        documents: request.pdfs,
        mode,
    };

    let outcome = state.chat_router.route(&message, &context).await?;

    Ok(Json(ChatResponse::from_outcome(chat_id, outcome)))
}
