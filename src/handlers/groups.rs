// handlers/groups.rs - /api/groups handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::database::models::{Group, GroupFilter, GroupRole, NewGroup};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::{normalize_query, required_text, resolve_limit, ApiPath, ApiQuery, ValidatedJson};

use super::ListQuery;

async fn find_group(state: &AppState, id: i32) -> ApiResult<Group> {
    state
        .storage
        .get_group(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))
}

/// GET /api/groups - list or search groups
pub async fn list(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<impl IntoResponse> {
    let filter = GroupFilter {
        query: normalize_query(query.q.as_deref()),
        limit: resolve_limit(&state.config, query.limit)?,
    };
    Ok(Json(state.storage.list_groups(&filter).await?))
}

/// GET /api/groups/mine - groups the caller belongs to
pub async fn mine(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.storage.list_user_groups(auth.id).await?))
}

/// GET /api/groups/:id
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> ApiResult<impl IntoResponse> {
    Ok(Json(find_group(&state, id).await?))
}

/// GET /api/groups/:id/members
pub async fn members(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> ApiResult<impl IntoResponse> {
    find_group(&state, id).await?;
    Ok(Json(state.storage.list_group_members(id).await?))
}

/// POST /api/groups - create a group; the creator becomes its owner
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<NewGroup>,
) -> ApiResult<impl IntoResponse> {
    let name = required_text(payload.name, "name")?;
    let group = state
        .storage
        .create_group(auth.id, &name, payload.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// POST /api/groups/:id/join
pub async fn join(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    find_group(&state, id).await?;
    let membership = state.storage.add_group_member(id, auth.id, GroupRole::Member).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// DELETE /api/groups/:id/leave
pub async fn leave(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    find_group(&state, id).await?;
    if !state.storage.remove_group_member(id, auth.id).await? {
        return Err(ApiError::not_found("You are not a member of this group"));
    }
    Ok(StatusCode::NO_CONTENT)
}
