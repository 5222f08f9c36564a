mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn get_company_returns_stored_record_or_404() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.register("owner@example.com", "recruiter").await?;
    let created = server.create_company(&owner, "Acme").await?;

    let (status, fetched) = server.get(&format!("/api/companies/{}", created["id"]), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert_eq!(fetched["status"], "pending");
    assert_eq!(fetched["ownerId"].as_i64(), Some(owner.id));

    let (status, body) = server.get("/api/companies/99999", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Company not found" }));
    Ok(())
}

#[tokio::test]
async fn create_requires_name() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.register("owner@example.com", "recruiter").await?;

    let (status, body) = server
        .post("/api/companies", &owner, json!({ "industry": "Retail" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0], json!({ "field": "name", "message": "This field is required" }));
    Ok(())
}

#[tokio::test]
async fn public_list_shows_only_approved() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin().await?;
    let owner = server.register("owner@example.com", "recruiter").await?;
    let acme = server.create_company(&owner, "Acme").await?;
    server.create_company(&owner, "Globex").await?;

    let (_, listed) = server.get("/api/companies", None).await?;
    assert_eq!(listed, json!([]));

    server.approve_company(&admin, acme["id"].as_i64().unwrap()).await?;
    let (_, listed) = server.get("/api/companies", None).await?;
    let names: Vec<&str> = listed.as_array().unwrap().iter().filter_map(|c| c["name"].as_str()).collect();
    assert_eq!(names, vec!["Acme"]);

    let (status, pending) = server.get("/api/companies/pending", Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["name"], "Globex");

    let (status, all) = server.get("/api/companies/all", Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn admin_queues_are_admin_only() -> Result<()> {
    let server = TestServer::spawn().await?;
    let recruiter = server.register("recruiter@example.com", "recruiter").await?;

    let (status, _) = server.get("/api/companies/pending", Some(&recruiter)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.get("/api/companies/all", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn approval_is_idempotent() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin().await?;
    let owner = server.register("owner@example.com", "recruiter").await?;
    let company = server.create_company(&owner, "Acme").await?;
    let id = company["id"].as_i64().unwrap();

    let first = server.approve_company(&admin, id).await?;
    let second = server.approve_company(&admin, id).await?;
    assert_eq!(first["status"], "approved");
    assert_eq!(first, second);

    let (status, body) = server
        .patch(&format!("/api/companies/{}/status", id), &admin, json!({ "status": "bogus" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = server
        .patch(&format!("/api/companies/{}/status", id), &owner, json!({ "status": "approved" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn large_limits_are_clamped_not_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin().await?;
    let owner = server.register("owner@example.com", "recruiter").await?;
    for name in ["Acme", "Globex", "Initech"] {
        let company = server.create_company(&owner, name).await?;
        server.approve_company(&admin, company["id"].as_i64().unwrap()).await?;
    }

    let (status, body) = server.get("/api/companies?limit=50000", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = server.get("/api/companies?limit=2", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = server.get("/api/companies?limit=0", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = server.get("/api/companies?limit=lots", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn only_owner_or_admin_can_edit() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.register("owner@example.com", "recruiter").await?;
    let other = server.register("other@example.com", "recruiter").await?;
    let admin = server.admin().await?;
    let company = server.create_company(&owner, "Acme").await?;
    let path = format!("/api/companies/{}", company["id"]);

    let (status, _) = server
        .send(reqwest::Method::PUT, &path, &other, json!({ "name": "Hijacked" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .send(reqwest::Method::PUT, &path, &owner, json!({ "description": "Anvils" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Anvils");
    assert_eq!(body["name"], "Acme");

    assert_eq!(server.delete(&path, &other).await?, StatusCode::FORBIDDEN);
    assert_eq!(server.delete(&path, &admin).await?, StatusCode::NO_CONTENT);
    let (status, _) = server.get(&path, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn logo_upload_checks_type() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.register("owner@example.com", "recruiter").await?;
    let company = server.create_company(&owner, "Acme").await?;
    let path = server.url(&format!("/api/companies/{}/logo", company["id"]));

    let part = reqwest::multipart::Part::bytes(b"#!/bin/sh".to_vec()).file_name("logo.sh");
    let resp = server
        .client
        .post(&path)
        .bearer_auth(&owner.token)
        .multipart(reqwest::multipart::Form::new().part("logo", part))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let part = reqwest::multipart::Part::bytes(b"\x89PNG\r\n\x1a\n".to_vec()).file_name("logo.png");
    let resp = server
        .client
        .post(&path)
        .bearer_auth(&owner.token)
        .multipart(reqwest::multipart::Form::new().part("logo", part))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await?;
    let logo_url = body["logoUrl"].as_str().unwrap().to_string();
    assert!(logo_url.starts_with("/uploads/logos/"));

    let served = server.client.get(server.url(&logo_url)).send().await?;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await?.as_ref(), b"\x89PNG\r\n\x1a\n");
    Ok(())
}

#[tokio::test]
async fn whitespace_company_names_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.register("owner@example.com", "recruiter").await?;

    let (status, body) = server.post("/api/companies", &owner, json!({ "name": "   " })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "name");

    let company = server.create_company(&owner, "Acme").await?;
    let path = format!("/api/companies/{}", company["id"]);
    let (status, body) = server
        .send(reqwest::Method::PUT, &path, &owner, json!({ "name": "\t " }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "name");

    let (_, unchanged) = server.get(&path, None).await?;
    assert_eq!(unchanged["name"], "Acme");
    Ok(())
}
