mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = server.get("/health", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "ok");
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_json_404() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = server.get("/api/nothing/here", None).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Route not found" }));
    Ok(())
}

#[tokio::test]
async fn non_numeric_path_ids_are_400() -> Result<()> {
    let server = TestServer::spawn().await?;
    for path in ["/api/jobs/abc", "/api/companies/x1", "/api/groups/1.5", "/api/states/us"] {
        let (status, body) = server.get(path, None).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert!(body["message"].is_string(), "{}", path);
    }
    Ok(())
}
