mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn short_queries_never_reach_storage() -> Result<()> {
    let server = TestServer::spawn().await?;

    for path in ["/api/search?q=a", "/api/search?q=%20%20x%20", "/api/search", "/api/search/a"] {
        let before = server.storage.operations();
        let (status, body) = server.get(path, None).await?;
        assert_eq!(status, StatusCode::OK, "{}", path);
        assert_eq!(body, json!({ "companies": [], "jobs": [] }), "{}", path);
        assert_eq!(server.storage.operations(), before, "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn returns_companies_then_jobs() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin().await?;
    let recruiter = server.register("recruiter@example.com", "recruiter").await?;

    let rustworks = server.create_company(&recruiter, "RustWorks").await?;
    let rustworks_id = rustworks["id"].as_i64().unwrap();
    server.approve_company(&admin, rustworks_id).await?;
    // Pending companies are not searchable
    server.create_company(&recruiter, "Rusty Pending").await?;
    server.create_job(&recruiter, rustworks_id, "Rust Developer").await?;
    server.create_job(&recruiter, rustworks_id, "Go Developer").await?;

    let resp = server.client.get(server.url("/api/search?q=rust")).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let raw = resp.text().await?;
    let companies_at = raw.find("\"companies\"").unwrap();
    let jobs_at = raw.find("\"jobs\"").unwrap();
    assert!(companies_at < jobs_at);

    let body: serde_json::Value = serde_json::from_str(&raw)?;
    let companies: Vec<&str> = body["companies"].as_array().unwrap().iter().filter_map(|c| c["name"].as_str()).collect();
    let jobs: Vec<&str> = body["jobs"].as_array().unwrap().iter().filter_map(|j| j["title"].as_str()).collect();
    assert_eq!(companies, vec!["RustWorks"]);
    assert_eq!(jobs, vec!["Rust Developer"]);

    let (_, by_path) = server.get("/api/search/rust", None).await?;
    assert_eq!(by_path, body);
    Ok(())
}

#[tokio::test]
async fn search_limit_is_shared_per_side() -> Result<()> {
    let server = TestServer::spawn().await?;
    let recruiter = server.register("recruiter@example.com", "recruiter").await?;
    let company = server.create_company(&recruiter, "Acme").await?;
    for title in ["Data Engineer", "Platform Engineer", "Security Engineer"] {
        server.create_job(&recruiter, company["id"].as_i64().unwrap(), title).await?;
    }

    let (_, body) = server.get("/api/search?q=engineer&limit=2", None).await?;
    assert_eq!(body["jobs"].as_array().unwrap().len(), 2);

    let (status, _) = server.get("/api/search?q=engineer&limit=-1", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
