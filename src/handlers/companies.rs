// handlers/companies.rs - /api/companies handlers

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::database::models::{
    ApprovalStatus, ApprovalStatusUpdate, Company, CompanyFilter, JobFilter, NewCompany, UpdateCompany,
};
use crate::error::{ApiError, ApiResult};
use crate::middleware::{AdminUser, AuthUser};
use crate::state::AppState;
use crate::uploads::{self, UploadKind};
use crate::validation::{
    non_blank, normalize_query, required, required_text, resolve_limit, ApiPath, ApiQuery, ValidatedJson,
};

use super::ListQuery;

pub(crate) async fn find_company(state: &AppState, id: i32) -> ApiResult<Company> {
    state
        .storage
        .get_company(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))
}

async fn list_with_status(
    state: &AppState,
    query: ListQuery,
    status: Option<ApprovalStatus>,
) -> ApiResult<Vec<Company>> {
    let filter = CompanyFilter {
        query: normalize_query(query.q.as_deref()),
        status,
        limit: resolve_limit(&state.config, query.limit)?,
    };
    Ok(state.storage.list_companies(&filter).await?)
}

/// GET /api/companies - approved companies
pub async fn list(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<impl IntoResponse> {
    Ok(Json(list_with_status(&state, query, Some(ApprovalStatus::Approved)).await?))
}

/// GET /api/companies/all - every company regardless of status (admin)
pub async fn list_all(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(list_with_status(&state, query, None).await?))
}

/// GET /api/companies/pending - approval queue (admin)
pub async fn list_pending(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(list_with_status(&state, query, Some(ApprovalStatus::Pending)).await?))
}

/// GET /api/companies/:id - fetch one company
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> ApiResult<impl IntoResponse> {
    Ok(Json(find_company(&state, id).await?))
}

/// GET /api/companies/:id/jobs - active jobs posted for a company
pub async fn jobs(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    find_company(&state, id).await?;
    let filter = JobFilter {
        company_id: Some(id),
        active_only: true,
        limit: resolve_limit(&state.config, query.limit)?,
        ..Default::default()
    };
    Ok(Json(state.storage.list_jobs(&filter).await?))
}

/// POST /api/companies - register a company; it starts out pending approval
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(mut payload): ValidatedJson<NewCompany>,
) -> ApiResult<impl IntoResponse> {
    payload.name = Some(required_text(payload.name, "name")?);
    let company = state.storage.create_company(auth.id, payload).await?;
    tracing::info!(company_id = company.id, owner_id = auth.id, "Company created");
    Ok((StatusCode::CREATED, Json(company)))
}

/// PUT /api/companies/:id - update company details (owner or admin)
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(mut payload): ValidatedJson<UpdateCompany>,
) -> ApiResult<impl IntoResponse> {
    payload.name = non_blank(payload.name, "name")?;
    let company = find_company(&state, id).await?;
    auth.require_owner(company.owner_id, "You can only edit your own company")?;

    let company = state
        .storage
        .update_company(id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;
    Ok(Json(company))
}

/// DELETE /api/companies/:id - remove a company with its jobs (owner or admin)
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let company = find_company(&state, id).await?;
    auth.require_owner(company.owner_id, "You can only delete your own company")?;

    if !state.storage.delete_company(id).await? {
        return Err(ApiError::not_found("Company not found"));
    }
    tracing::info!(company_id = id, by = auth.id, "Company deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/companies/:id/status - approve or reject (admin)
///
/// Any state may move to any state; repeating the current state is a no-op.
pub async fn set_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(payload): ValidatedJson<ApprovalStatusUpdate>,
) -> ApiResult<impl IntoResponse> {
    let status = required(payload.status, "status")?;
    let company = state
        .storage
        .set_company_status(id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;
    tracing::info!(company_id = id, admin_id = admin.id, ?status, "Company status set");
    Ok(Json(company))
}

/// POST /api/companies/:id/logo - multipart `logo` image upload (owner or admin)
pub async fn upload_logo(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let company = find_company(&state, id).await?;
    auth.require_owner(company.owner_id, "You can only edit your own company")?;

    let mut logo_url = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UploadKind::Logo.field()) {
            logo_url = Some(uploads::accept_field(&state.config.uploads, UploadKind::Logo, field).await?);
            break;
        }
    }
    let logo_url = required(logo_url, UploadKind::Logo.field())?;

    let company = state
        .storage
        .set_company_logo(id, &logo_url)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;
    Ok(Json(company))
}
