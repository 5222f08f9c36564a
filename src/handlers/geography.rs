// handlers/geography.rs - static country/state/city lookups

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validation::ApiPath;

/// GET /api/countries
pub async fn countries(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.geography.countries().to_vec())
}

/// GET /api/states/:countryId
pub async fn states(State(state): State<AppState>, ApiPath(country_id): ApiPath<i32>) -> ApiResult<impl IntoResponse> {
    let states = state
        .geography
        .states_of(country_id)
        .ok_or_else(|| ApiError::not_found("Country not found"))?;
    Ok(Json(states.into_iter().cloned().collect::<Vec<_>>()))
}

/// GET /api/cities/:stateId
pub async fn cities(State(state): State<AppState>, ApiPath(state_id): ApiPath<i32>) -> ApiResult<impl IntoResponse> {
    let cities = state
        .geography
        .cities_of(state_id)
        .ok_or_else(|| ApiError::not_found("State not found"))?;
    Ok(Json(cities.into_iter().cloned().collect::<Vec<_>>()))
}
