// handlers/jobs.rs - /api/jobs handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::database::models::{
    compose_location, ExperienceLevel, Job, JobFilter, JobType, NewJob, UpdateJob, UserType,
};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::{
    non_blank, normalize_query, required, required_text, resolve_limit, ApiPath, ApiQuery, ValidatedJson,
};

use super::companies::find_company;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    pub q: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub location: Option<String>,
    pub company_id: Option<i32>,
    pub limit: Option<i64>,
}

pub(crate) async fn find_job(state: &AppState, id: i32) -> ApiResult<Job> {
    state
        .storage
        .get_job(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))
}

/// Salaries are stored as NUMERIC(12, 2)
const SALARY_CEILING: i64 = 10_000_000_000;
const SALARY_SCALE: u32 = 2;

fn check_amount(value: Option<Decimal>, field: &str) -> ApiResult<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if value.is_sign_negative() {
        return Err(ApiError::invalid_field(field, "Must not be negative"));
    }
    if value >= Decimal::from(SALARY_CEILING) {
        return Err(ApiError::invalid_field(
            field,
            format!("Must be less than {}", SALARY_CEILING),
        ));
    }
    if value.normalize().scale() > SALARY_SCALE {
        return Err(ApiError::invalid_field(
            field,
            format!("Must have at most {} decimal places", SALARY_SCALE),
        ));
    }
    Ok(())
}

fn check_salary(min: Option<Decimal>, max: Option<Decimal>) -> ApiResult<()> {
    check_amount(min, "salaryMin")?;
    check_amount(max, "salaryMax")?;
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ApiError::invalid_field(
                "salaryMax",
                "Must be greater than or equal to salaryMin",
            ));
        }
    }
    Ok(())
}

/// GET /api/jobs - active jobs, newest first
pub async fn list(State(state): State<AppState>, ApiQuery(query): ApiQuery<JobQuery>) -> ApiResult<impl IntoResponse> {
    let filter = JobFilter {
        query: normalize_query(query.q.as_deref()),
        job_type: query.job_type,
        experience_level: query.experience_level,
        location: normalize_query(query.location.as_deref()),
        company_id: query.company_id,
        active_only: true,
        limit: resolve_limit(&state.config, query.limit)?,
    };
    Ok(Json(state.storage.list_jobs(&filter).await?))
}

/// GET /api/jobs/:id - fetch one job
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> ApiResult<impl IntoResponse> {
    Ok(Json(find_job(&state, id).await?))
}

/// POST /api/jobs - post a job for a company the caller owns
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(mut payload): ValidatedJson<NewJob>,
) -> ApiResult<impl IntoResponse> {
    if auth.user_type == UserType::JobSeeker {
        return Err(ApiError::forbidden("Only recruiters and admins can post jobs"));
    }
    payload.title = Some(required_text(payload.title, "title")?);
    payload.description = Some(required_text(payload.description, "description")?);
    check_salary(payload.salary_min, payload.salary_max)?;

    let company_id = required(payload.company_id, "companyId")?;
    let company = find_company(&state, company_id).await?;
    auth.require_owner(company.owner_id, "You can only post jobs for your own company")?;

    let record = payload.into_record(auth.id);
    if record.location.is_empty() {
        return Err(ApiError::invalid_field(
            "location",
            "Provide a location or a city, state or country",
        ));
    }

    let job = state.storage.create_job(record).await?;
    tracing::info!(job_id = job.id, company_id, "Job posted");
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/jobs/:id - edit a job (poster or admin)
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(mut payload): ValidatedJson<UpdateJob>,
) -> ApiResult<impl IntoResponse> {
    let job = find_job(&state, id).await?;
    auth.require_owner(job.posted_by, "You can only edit jobs you posted")?;
    payload.title = non_blank(payload.title, "title")?;
    payload.description = non_blank(payload.description, "description")?;

    check_salary(
        payload.salary_min.or(job.salary_min),
        payload.salary_max.or(job.salary_max),
    )?;

    // Re-derive the display location when only its parts changed
    let parts_changed = payload.city.is_some() || payload.state.is_some() || payload.country.is_some();
    payload.location = match payload.location.as_deref().map(str::trim) {
        Some(explicit) if !explicit.is_empty() => Some(explicit.to_string()),
        _ if parts_changed => {
            let composed = compose_location(
                payload.city.as_deref().or(job.city.as_deref()),
                payload.state.as_deref().or(job.state.as_deref()),
                payload.country.as_deref().or(job.country.as_deref()),
            );
            (!composed.is_empty()).then_some(composed)
        }
        _ => None,
    };

    let job = state
        .storage
        .update_job(id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(job))
}

/// DELETE /api/jobs/:id - remove a job and its applications (poster or admin)
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let job = find_job(&state, id).await?;
    auth.require_owner(job.posted_by, "You can only delete jobs you posted")?;

    if !state.storage.delete_job(id).await? {
        return Err(ApiError::not_found("Job not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/jobs/:id/applications - applications received (poster or admin)
pub async fn applications(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let job = find_job(&state, id).await?;
    auth.require_owner(job.posted_by, "You can only view applications for jobs you posted")?;
    Ok(Json(state.storage.list_applications_for_job(id).await?))
}
