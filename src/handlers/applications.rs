// handlers/applications.rs - /api/applications handlers

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::database::models::{ApplicationStatusUpdate, JobApplication, NewApplicationRecord};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::uploads::{self, UploadKind};
use crate::validation::{required, ApiPath, ValidatedJson};

use super::jobs::find_job;

const MAX_COVER_LETTER: usize = 10_000;

async fn find_application(state: &AppState, id: i32) -> ApiResult<JobApplication> {
    state
        .storage
        .get_application(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))
}

/// Fields collected from the multipart body
#[derive(Default)]
struct ApplicationForm {
    job_id: Option<String>,
    cover_letter: Option<String>,
    resume: Option<(String, Vec<u8>)>,
}

async fn read_form(state: &AppState, multipart: &mut Multipart) -> ApiResult<ApplicationForm> {
    let config = &state.config.uploads;
    let mut form = ApplicationForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "jobId" => form.job_id = Some(field.text().await?),
            "coverLetter" => form.cover_letter = Some(field.text().await?),
            "resume" => {
                // Reject before reading the file body
                let ext = uploads::check_extension(config, UploadKind::Resume, field.file_name())?;
                let bytes = field.bytes().await?;
                uploads::check_size(config, UploadKind::Resume, bytes.len())?;
                form.resume = Some((ext, bytes.to_vec()));
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/applications - multipart `jobId`, optional `coverLetter` and `resume`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = read_form(&state, &mut multipart).await?;

    let job_id = required(form.job_id, "jobId")?
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::invalid_field("jobId", "Must be a positive integer"))?;

    let cover_letter = form.cover_letter.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
    if cover_letter.as_ref().is_some_and(|c| c.chars().count() > MAX_COVER_LETTER) {
        return Err(ApiError::invalid_field(
            "coverLetter",
            format!("Must be at most {} characters", MAX_COVER_LETTER),
        ));
    }

    let job = find_job(&state, job_id).await?;
    if !job.is_active {
        return Err(ApiError::bad_request("This job is no longer accepting applications"));
    }

    // Written to disk only after the record is inserted
    let resume = form
        .resume
        .map(|(ext, bytes)| (uploads::content_name(&bytes, &ext), bytes));

    let application = state
        .storage
        .create_application(NewApplicationRecord {
            job_id,
            applicant_id: auth.id,
            cover_letter,
            resume_url: resume.as_ref().map(|(name, _)| uploads::public_url(UploadKind::Resume, name)),
        })
        .await?;

    if let Some((name, bytes)) = &resume {
        if let Err(e) = uploads::write(&state.config.uploads, UploadKind::Resume, name, bytes).await {
            state.storage.delete_application(application.id).await?;
            return Err(e);
        }
    }

    tracing::info!(application_id = application.id, job_id, applicant_id = auth.id, "Application submitted");
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/applications/mine - the caller's own applications
pub async fn mine(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.storage.list_applications_for_user(auth.id).await?))
}

/// GET /api/applications/:id - visible to the applicant, the job poster and admins
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let application = find_application(&state, id).await?;
    if application.applicant_id != auth.id {
        let job = find_job(&state, application.job_id).await?;
        auth.require_owner(job.posted_by, "You cannot view this application")?;
    }
    Ok(Json(application))
}

/// PATCH /api/applications/:id/status - move an application through review (poster or admin)
pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(payload): ValidatedJson<ApplicationStatusUpdate>,
) -> ApiResult<impl IntoResponse> {
    let status = required(payload.status, "status")?;
    let application = find_application(&state, id).await?;
    let job = find_job(&state, application.job_id).await?;
    auth.require_owner(job.posted_by, "Only the job poster can update application status")?;

    let application = state
        .storage
        .set_application_status(id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;
    Ok(Json(application))
}

/// DELETE /api/applications/:id - withdraw (applicant or admin)
pub async fn withdraw(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let application = find_application(&state, id).await?;
    auth.require_owner(application.applicant_id, "You can only withdraw your own applications")?;

    if !state.storage.delete_application(id).await? {
        return Err(ApiError::not_found("Application not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
