// handlers/vendors.rs - /api/vendors handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use crate::database::models::{ApprovalStatus, ApprovalStatusUpdate, NewVendor, VendorFilter};
use crate::error::{ApiError, ApiResult};
use crate::middleware::{AdminUser, AuthUser};
use crate::state::AppState;
use crate::validation::{required, required_text, resolve_limit, ApiPath, ApiQuery, ValidatedJson};

use super::companies::find_company;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorQuery {
    pub company_id: Option<i32>,
    pub limit: Option<i64>,
}

/// GET /api/vendors - approved vendors, optionally for one client company
pub async fn list(State(state): State<AppState>, ApiQuery(query): ApiQuery<VendorQuery>) -> ApiResult<impl IntoResponse> {
    let filter = VendorFilter {
        status: Some(ApprovalStatus::Approved),
        company_id: query.company_id,
        limit: resolve_limit(&state.config, query.limit)?,
    };
    Ok(Json(state.storage.list_vendors(&filter).await?))
}

/// GET /api/vendors/pending - approval queue (admin)
pub async fn pending(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<VendorQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = VendorFilter {
        status: Some(ApprovalStatus::Pending),
        company_id: query.company_id,
        limit: resolve_limit(&state.config, query.limit)?,
    };
    Ok(Json(state.storage.list_vendors(&filter).await?))
}

/// GET /api/vendors/:id
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> ApiResult<impl IntoResponse> {
    let vendor = state
        .storage
        .get_vendor(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Vendor not found"))?;
    Ok(Json(vendor))
}

/// POST /api/vendors - register a vendor for a client company (pending approval)
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(mut payload): ValidatedJson<NewVendor>,
) -> ApiResult<impl IntoResponse> {
    payload.name = Some(required_text(payload.name, "name")?);
    let company_id = required(payload.company_id, "companyId")?;
    find_company(&state, company_id).await?;

    let vendor = state.storage.create_vendor(auth.id, payload).await?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

/// PATCH /api/vendors/:id/status - approve or reject (admin)
pub async fn set_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(payload): ValidatedJson<ApprovalStatusUpdate>,
) -> ApiResult<impl IntoResponse> {
    let status = required(payload.status, "status")?;
    let vendor = state
        .storage
        .set_vendor_status(id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Vendor not found"))?;
    tracing::info!(vendor_id = id, admin_id = admin.id, ?status, "Vendor status set");
    Ok(Json(vendor))
}
