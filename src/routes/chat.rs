use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use crate::{
    error::{AppError, AppResult},
    message::{ChatRequest, ChatResponse},
    services::relay::{EMPTY_MESSAGE, FALLBACK_REPLY, build_messages, extract_reply},
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(payload) = payload.map_err(|rejection| AppError::Internal(rejection.body_text()))?;

    let trimmed = payload.message.as_deref().unwrap_or_default().trim();

    if trimmed.is_empty() {
        return Err(AppError::BadRequest(EMPTY_MESSAGE.to_string()));
    }

    let messages = build_messages(trimmed, payload.image_url.as_deref());
    tracing::debug!(
        message_len = trimmed.len(),
        with_image = messages.len() > 1,
        model = %state.config.model,
        "relaying chat message"
    );

    let response = state.upstream.complete(&messages).await?;

    let reply = extract_reply(response).unwrap_or_else(|| {
        tracing::warn!("upstream returned no choices");
        FALLBACK_REPLY.to_string()
    });

    Ok(Json(ChatResponse { reply }))
}
