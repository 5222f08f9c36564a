pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod uploads;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::state::AppState;

/// Build the full HTTP application
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .route("/health", get(handlers::health::health))
        .merge(auth_routes())
        .merge(user_routes())
        .merge(company_routes())
        .merge(job_routes())
        .merge(application_routes())
        .merge(search_routes())
        .merge(social_routes())
        .merge(vendor_routes())
        .merge(geography_routes())
        .nest_service(uploads::PUBLIC_PREFIX, ServeDir::new(&config.uploads.dir))
        .fallback(route_not_found)
        // Global middleware
        .layer(from_fn_with_state(state.clone(), middleware::resolve_identity))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config));

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };
    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
}

fn user_routes() -> Router<AppState> {
    use handlers::{auth, users};

    Router::new()
        .route("/api/users", get(users::search))
        .route("/api/users/me", get(auth::me).put(users::update_me))
        .route("/api/users/:id", get(users::get))
}

fn company_routes() -> Router<AppState> {
    use handlers::companies;

    Router::new()
        .route("/api/companies", get(companies::list).post(companies::create))
        .route("/api/companies/all", get(companies::list_all))
        .route("/api/companies/pending", get(companies::list_pending))
        .route(
            "/api/companies/:id",
            get(companies::get).put(companies::update).delete(companies::delete),
        )
        .route("/api/companies/:id/jobs", get(companies::jobs))
        .route("/api/companies/:id/status", patch(companies::set_status))
        .route("/api/companies/:id/logo", post(companies::upload_logo))
}

fn job_routes() -> Router<AppState> {
    use handlers::jobs;

    Router::new()
        .route("/api/jobs", get(jobs::list).post(jobs::create))
        .route("/api/jobs/:id", get(jobs::get).put(jobs::update).delete(jobs::delete))
        .route("/api/jobs/:id/applications", get(jobs::applications))
}

fn application_routes() -> Router<AppState> {
    use handlers::applications;

    Router::new()
        .route("/api/applications", post(applications::create))
        .route("/api/applications/mine", get(applications::mine))
        .route(
            "/api/applications/:id",
            get(applications::get).delete(applications::withdraw),
        )
        .route("/api/applications/:id/status", patch(applications::set_status))
}

fn search_routes() -> Router<AppState> {
    use handlers::search;

    Router::new()
        .route("/api/search", get(search::search))
        .route("/api/search/:query", get(search::search_path))
}

fn social_routes() -> Router<AppState> {
    use handlers::{connections, groups, messages};

    Router::new()
        // Connections
        .route("/api/connections", get(connections::list).post(connections::create))
        .route("/api/connections/pending", get(connections::pending))
        .route(
            "/api/connections/:id",
            patch(connections::respond).delete(connections::delete),
        )
        // Messages
        .route("/api/messages", post(messages::send))
        .route("/api/messages/conversations", get(messages::conversations))
        .route("/api/messages/unread-count", get(messages::unread_count))
        .route("/api/messages/:id", get(messages::thread))
        .route("/api/messages/:id/read", patch(messages::mark_read))
        // Groups
        .route("/api/groups", get(groups::list).post(groups::create))
        .route("/api/groups/mine", get(groups::mine))
        .route("/api/groups/:id", get(groups::get))
        .route("/api/groups/:id/members", get(groups::members))
        .route("/api/groups/:id/join", post(groups::join))
        .route("/api/groups/:id/leave", delete(groups::leave))
}

fn vendor_routes() -> Router<AppState> {
    use handlers::vendors;

    Router::new()
        .route("/api/vendors", get(vendors::list).post(vendors::create))
        .route("/api/vendors/pending", get(vendors::pending))
        .route("/api/vendors/:id", get(vendors::get))
        .route("/api/vendors/:id/status", patch(vendors::set_status))
}

fn geography_routes() -> Router<AppState> {
    use handlers::geography;

    Router::new()
        .route("/api/countries", get(geography::countries))
        .route("/api/states/:countryId", get(geography::states))
        .route("/api/cities/:stateId", get(geography::cities))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.is_production() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Route not found" })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::database::MemoryStorage;
    use crate::geo::Geography;

    fn router_with(config: AppConfig) -> Router {
        let state = AppState::new(config, Arc::new(MemoryStorage::new()), Geography::embedded().unwrap());
        app(state)
    }

    fn router() -> Router {
        router_with(AppConfig::development())
    }

    async fn call(uri: &str) -> (StatusCode, Value) {
        call_on(router(), uri).await
    }

    async fn call_on(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn unknown_routes_get_json_404() {
        let (status, body) = call("/api/does-not-exist").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Route not found" }));
    }

    #[tokio::test]
    async fn literal_segments_beat_id_params() {
        // Would be a 400 (non-numeric id) if routed to /api/companies/:id
        let (status, body) = call("/api/companies/pending").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Authentication required");
    }

    #[tokio::test]
    async fn non_numeric_ids_are_bad_requests() {
        let (status, body) = call("/api/jobs/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid path parameter"));
    }

    #[tokio::test]
    async fn serves_without_request_logging() {
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;

        let (status, body) = call_on(router_with(config), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
