// handlers/messages.rs - /api/messages handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::NewMessage;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::{required, resolve_limit, ApiPath, ApiQuery, ValidatedJson};

#[derive(Debug, Default, Deserialize)]
pub struct ThreadQuery {
    pub limit: Option<i64>,
}

/// GET /api/messages/conversations - latest message per partner
pub async fn conversations(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.storage.list_conversations(auth.id).await?))
}

/// GET /api/messages/unread-count
pub async fn unread_count(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let count = state.storage.count_unread_messages(auth.id).await?;
    Ok(Json(json!({ "count": count })))
}

/// GET /api/messages/:id - thread with user `id`, oldest first
pub async fn thread(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(peer_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<ThreadQuery>,
) -> ApiResult<impl IntoResponse> {
    let limit = resolve_limit(&state.config, query.limit)?;
    if state.storage.get_user(peer_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(Json(state.storage.list_conversation(auth.id, peer_id, limit).await?))
}

/// POST /api/messages - send a direct message
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<NewMessage>,
) -> ApiResult<impl IntoResponse> {
    let recipient_id = required(payload.recipient_id, "recipientId")?;
    let content = required(payload.content, "content")?;
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::invalid_field("content", "This field is required"));
    }
    if recipient_id == auth.id {
        return Err(ApiError::invalid_field("recipientId", "You cannot message yourself"));
    }
    if state.storage.get_user(recipient_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let message = state.storage.create_message(auth.id, recipient_id, content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// PATCH /api/messages/:id/read - recipient marks a message as read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let message = state
        .storage
        .get_message(id)
        .await?
        .filter(|m| m.sender_id == auth.id || m.recipient_id == auth.id)
        .ok_or_else(|| ApiError::not_found("Message not found"))?;
    if message.recipient_id != auth.id {
        return Err(ApiError::forbidden("Only the recipient can mark a message as read"));
    }
    if message.is_read {
        return Ok(Json(message));
    }

    let message = state
        .storage
        .mark_message_read(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;
    Ok(Json(message))
}
