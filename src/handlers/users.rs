// handlers/users.rs - /api/users handlers

use axum::{extract::State, response::IntoResponse, Json};

use crate::database::models::UpdateProfile;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::{normalize_query, resolve_limit, ApiPath, ApiQuery, ValidatedJson};

use super::ListQuery;

/// GET /api/users - search people by name, email or headline
pub async fn search(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let limit = resolve_limit(&state.config, query.limit)?;
    let q = normalize_query(query.q.as_deref());
    let users = state.storage.search_users(q.as_deref(), limit).await?;
    Ok(Json(users))
}

/// GET /api/users/:id - public profile
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> ApiResult<impl IntoResponse> {
    let user = state
        .storage
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}

/// PUT /api/users/me - update the caller's own profile
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfile>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .storage
        .update_user(auth.id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}
