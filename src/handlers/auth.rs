// handlers/auth.rs - /api/auth handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::auth::{hash_password, issue_token, verify_password};
use crate::database::models::{LoginRequest, NewUserRecord, RegisterUser, UserType};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::{required, ValidatedJson};

const BAD_CREDENTIALS: &str = "Invalid email or password";

/// POST /api/auth/register - create an account and return a session token
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterUser>,
) -> ApiResult<impl IntoResponse> {
    let user_type = payload.user_type.unwrap_or_default();
    if user_type == UserType::Admin {
        return Err(ApiError::invalid_field(
            "userType",
            "Admin accounts cannot be self-registered",
        ));
    }

    let email = required(payload.email, "email")?.trim().to_lowercase();
    let password = required(payload.password, "password")?;

    let record = NewUserRecord {
        email,
        password_hash: hash_password(&password)?,
        first_name: required(payload.first_name, "firstName")?.trim().to_string(),
        last_name: required(payload.last_name, "lastName")?.trim().to_string(),
        user_type,
    };

    let user = state.storage.create_user(record).await?;
    let token = issue_token(&state.config.security, &user)?;
    tracing::info!(user_id = user.id, user_type = user.user_type.as_str(), "Registered user");

    Ok((StatusCode::CREATED, Json(json!({ "token": token, "user": user }))))
}

/// POST /api/auth/login - exchange credentials for a session token
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = required(payload.email, "email")?.trim().to_lowercase();
    let password = required(payload.password, "password")?;

    let Some(user) = state.storage.get_user_by_email(&email).await? else {
        tracing::debug!("Login for unknown email");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    if !verify_password(&password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "Login with wrong password");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let token = issue_token(&state.config.security, &user)?;
    Ok(Json(json!({ "token": token, "user": user })))
}

/// GET /api/auth/me - the account behind the session
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let user = state
        .storage
        .get_user(auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}
