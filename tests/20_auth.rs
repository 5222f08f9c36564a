mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_login_and_me() -> Result<()> {
    let server = TestServer::spawn().await?;
    let session = server.register("Ada@Example.com", "job_seeker").await?;

    let (status, me) = server.get("/api/auth/me", Some(&session)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada@example.com");
    assert_eq!(me["userType"], "job_seeker");
    assert!(me.get("passwordHash").is_none());

    let resp = server
        .client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "ada@example.com", "password": "correct-horse-battery" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_401() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("grace@example.com", "recruiter").await?;

    let resp = server
        .client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "grace@example.com", "password": "not-the-password" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await?;
    assert_eq!(body, json!({ "message": "Invalid email or password" }));
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_409() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("dup@example.com", "job_seeker").await?;

    let resp = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({
            "email": "DUP@example.com",
            "password": "another-password",
            "firstName": "D",
            "lastName": "Up",
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn admins_cannot_self_register() -> Result<()> {
    let server = TestServer::spawn().await?;
    let resp = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({
            "email": "root@example.com",
            "password": "correct-horse-battery",
            "firstName": "R",
            "lastName": "Oot",
            "userType": "admin",
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["errors"][0]["field"], "userType");
    Ok(())
}

#[tokio::test]
async fn register_names_missing_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let resp = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "email": "x@example.com", "password": "correct-horse-battery" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Validation failed");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["firstName", "lastName"]);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_session() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.get("/api/auth/me", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Authentication required" }));

    let resp = server
        .client
        .post(server.url("/api/companies"))
        .json(&json!({ "name": "Sneaky Inc" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn garbage_tokens_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let resp = server
        .client
        .get(server.url("/api/auth/me"))
        .bearer_auth("not.a.jwt")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["message"], "Invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn stale_tokens_do_not_block_public_routes() -> Result<()> {
    let server = TestServer::spawn().await?;

    let resp = server
        .client
        .get(server.url("/api/jobs"))
        .bearer_auth("not.a.jwt")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = server
        .client
        .get(server.url("/api/does-not-exist"))
        .bearer_auth("not.a.jwt")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .client
        .get(server.url("/api/companies"))
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn profile_updates() -> Result<()> {
    let server = TestServer::spawn().await?;
    let session = server.register("profile@example.com", "job_seeker").await?;

    let (status, body) = server
        .send(
            reqwest::Method::PUT,
            "/api/users/me",
            &session,
            json!({ "headline": "Rustacean", "location": "Austin, TX" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["headline"], "Rustacean");
    assert_eq!(body["firstName"], "Test");

    let (status, public) = server.get(&format!("/api/users/{}", session.id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["headline"], "Rustacean");

    let (status, body) = server.get("/api/users/99999", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "User not found" }));
    Ok(())
}
