// handlers/search.rs - GET /api/search handlers

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::database::models::{ApprovalStatus, Company, CompanyFilter, Job, JobFilter};
use crate::database::StorageResult;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validation::{ApiPath, ApiQuery};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

/// Serialized with `companies` before `jobs`
#[derive(Debug, Default, Serialize)]
pub struct SearchResults {
    pub companies: Vec<Company>,
    pub jobs: Vec<Job>,
}

/// Combine the two independent lookups.
///
/// A failed side degrades to an empty list; only a double failure is an error.
pub fn merge_results(
    companies: StorageResult<Vec<Company>>,
    jobs: StorageResult<Vec<Job>>,
) -> ApiResult<SearchResults> {
    match (companies, jobs) {
        (Ok(companies), Ok(jobs)) => Ok(SearchResults { companies, jobs }),
        (Ok(companies), Err(e)) => {
            tracing::warn!("Job search failed, returning companies only: {}", e);
            Ok(SearchResults { companies, jobs: Vec::new() })
        }
        (Err(e), Ok(jobs)) => {
            tracing::warn!("Company search failed, returning jobs only: {}", e);
            Ok(SearchResults { companies: Vec::new(), jobs })
        }
        (Err(company_err), Err(job_err)) => Err(ApiError::internal(format!(
            "search failed: companies: {}; jobs: {}",
            company_err, job_err
        ))),
    }
}

async fn run_search(state: &AppState, raw: Option<&str>, limit: Option<i64>) -> ApiResult<SearchResults> {
    let term = raw.map(str::trim).unwrap_or_default();
    if term.chars().count() < state.config.search.min_query_len {
        return Ok(SearchResults::default());
    }

    let limit = match limit {
        Some(n) if n < 1 => return Err(ApiError::invalid_field("limit", "Must be a positive integer")),
        Some(n) => n.min(state.config.api.max_limit),
        None => state.config.search.result_limit,
    };

    let company_filter = CompanyFilter {
        query: Some(term.to_string()),
        status: Some(ApprovalStatus::Approved),
        limit,
    };
    let job_filter = JobFilter {
        query: Some(term.to_string()),
        active_only: true,
        limit,
        ..Default::default()
    };

    let (companies, jobs) = tokio::join!(
        state.storage.list_companies(&company_filter),
        state.storage.list_jobs(&job_filter),
    );
    merge_results(companies, jobs)
}

/// GET /api/search?q= - approved companies and active jobs matching `q`
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(run_search(&state, query.q.as_deref(), query.limit).await?))
}

/// GET /api/search/:query - same as `?q=` with the term in the path
pub async fn search_path(
    State(state): State<AppState>,
    ApiPath(term): ApiPath<String>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(run_search(&state, Some(&term), query.limit).await?))
}
