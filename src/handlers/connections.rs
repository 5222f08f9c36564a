// handlers/connections.rs - /api/connections handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::database::models::{Connection, ConnectionRequest, ConnectionStatus, ConnectionStatusUpdate};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::{required, ApiPath, ValidatedJson};

/// Connections the caller is not part of are reported as missing
async fn find_connection(state: &AppState, auth: &AuthUser, id: i32) -> ApiResult<Connection> {
    state
        .storage
        .get_connection(id)
        .await?
        .filter(|c| c.involves(auth.id) || auth.is_admin())
        .ok_or_else(|| ApiError::not_found("Connection not found"))
}

/// GET /api/connections - accepted connections in either direction
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.storage.list_connections(auth.id, ConnectionStatus::Accepted).await?))
}

/// GET /api/connections/pending - requests waiting on the caller
pub async fn pending(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.storage.list_connection_requests(auth.id).await?))
}

/// POST /api/connections - send a connection request
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<ConnectionRequest>,
) -> ApiResult<impl IntoResponse> {
    let addressee_id = required(payload.addressee_id, "addresseeId")?;
    if addressee_id == auth.id {
        return Err(ApiError::invalid_field("addresseeId", "You cannot connect with yourself"));
    }
    if state.storage.get_user(addressee_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let connection = state.storage.create_connection(auth.id, addressee_id).await?;
    Ok((StatusCode::CREATED, Json(connection)))
}

/// PATCH /api/connections/:id - accept or reject a pending request (addressee only)
///
/// Repeating the recorded answer is a no-op; changing it afterwards is rejected.
pub async fn respond(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(payload): ValidatedJson<ConnectionStatusUpdate>,
) -> ApiResult<impl IntoResponse> {
    let status = required(payload.status, "status")?;
    if status == ConnectionStatus::Pending {
        return Err(ApiError::invalid_field("status", "Must be accepted or rejected"));
    }

    let connection = find_connection(&state, &auth, id).await?;
    if connection.addressee_id != auth.id {
        return Err(ApiError::forbidden("Only the recipient can respond to this request"));
    }

    match connection.status {
        ConnectionStatus::Pending => {}
        current if current == status => return Ok(Json(connection)),
        _ => return Err(ApiError::bad_request("This request has already been answered")),
    }

    let connection = state
        .storage
        .set_connection_status(id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Connection not found"))?;
    Ok(Json(connection))
}

/// DELETE /api/connections/:id - either party may remove a connection or request
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    find_connection(&state, &auth, id).await?;
    if !state.storage.delete_connection(id).await? {
        return Err(ApiError::not_found("Connection not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
