mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn location_is_derived_from_parts() -> Result<()> {
    let server = TestServer::spawn().await?;
    let recruiter = server.register("recruiter@example.com", "recruiter").await?;
    let company = server.create_company(&recruiter, "Acme").await?;

    let (status, job) = server
        .post(
            "/api/jobs",
            &recruiter,
            json!({
                "companyId": company["id"],
                "title": "Backend Engineer",
                "description": "Own the API",
                "jobType": "full_time",
                "experienceLevel": "senior",
                "city": "Austin",
                "state": "TX",
                "country": "US",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(job["location"], "Austin, TX, US");
    assert_eq!(job["isActive"], true);

    let (_, stored) = server.get(&format!("/api/jobs/{}", job["id"]), None).await?;
    assert_eq!(stored["location"], "Austin, TX, US");
    Ok(())
}

#[tokio::test]
async fn missing_job_is_404_with_message() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = server.get("/api/jobs/99999", None).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Job not found" }));
    Ok(())
}

#[tokio::test]
async fn create_validates_payload() -> Result<()> {
    let server = TestServer::spawn().await?;
    let recruiter = server.register("recruiter@example.com", "recruiter").await?;
    let company = server.create_company(&recruiter, "Acme").await?;

    let (status, body) = server
        .post(
            "/api/jobs",
            &recruiter,
            json!({
                "companyId": company["id"],
                "description": "No title here",
                "jobType": "contract",
                "experienceLevel": "entry",
                "location": "Remote",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "title");

    let (status, body) = server
        .post(
            "/api/jobs",
            &recruiter,
            json!({
                "companyId": company["id"],
                "title": "Engineer",
                "description": "Build",
                "jobType": "contract",
                "experienceLevel": "entry",
                "location": "Remote",
                "salaryMin": 120000,
                "salaryMax": 90000,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "salaryMax");
    Ok(())
}

#[tokio::test]
async fn posting_requires_recruiter_owning_company() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.register("owner@example.com", "recruiter").await?;
    let rival = server.register("rival@example.com", "recruiter").await?;
    let seeker = server.register("seeker@example.com", "job_seeker").await?;
    let company = server.create_company(&owner, "Acme").await?;
    let company_id = company["id"].as_i64().unwrap();

    let payload = json!({
        "companyId": company_id,
        "title": "Engineer",
        "description": "Build",
        "jobType": "full_time",
        "experienceLevel": "mid",
        "location": "Remote",
    });

    let (status, _) = server.post("/api/jobs", &seeker, payload.clone()).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.post("/api/jobs", &rival, payload.clone()).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut missing_company = payload.clone();
    missing_company["companyId"] = json!(4242);
    let (status, body) = server.post("/api/jobs", &owner, missing_company).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Company not found");
    Ok(())
}

#[tokio::test]
async fn list_filters_and_hides_inactive() -> Result<()> {
    let server = TestServer::spawn().await?;
    let recruiter = server.register("recruiter@example.com", "recruiter").await?;
    let company = server.create_company(&recruiter, "Acme").await?;
    let company_id = company["id"].as_i64().unwrap();

    let backend = server.create_job(&recruiter, company_id, "Backend Engineer").await?;
    let frontend = server.create_job(&recruiter, company_id, "Frontend Engineer").await?;

    let (status, closed) = server
        .send(
            reqwest::Method::PUT,
            &format!("/api/jobs/{}", frontend["id"]),
            &recruiter,
            json!({ "isActive": false, "jobType": "contract" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["isActive"], false);
    assert_eq!(closed["title"], "Frontend Engineer");

    let (_, listed) = server.get("/api/jobs", None).await?;
    let ids: Vec<i64> = listed.as_array().unwrap().iter().filter_map(|j| j["id"].as_i64()).collect();
    assert_eq!(ids, vec![backend["id"].as_i64().unwrap()]);

    let (_, filtered) = server.get("/api/jobs?q=backend&jobType=full_time", None).await?;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    let (_, filtered) = server.get("/api/jobs?experienceLevel=executive", None).await?;
    assert_eq!(filtered, json!([]));

    let (status, _) = server.get("/api/jobs?jobType=gig", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, by_company) = server.get(&format!("/api/companies/{}/jobs", company_id), None).await?;
    assert_eq!(by_company.as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn only_poster_can_edit_or_delete() -> Result<()> {
    let server = TestServer::spawn().await?;
    let recruiter = server.register("recruiter@example.com", "recruiter").await?;
    let other = server.register("other@example.com", "recruiter").await?;
    let company = server.create_company(&recruiter, "Acme").await?;
    let job = server.create_job(&recruiter, company["id"].as_i64().unwrap(), "Engineer").await?;
    let path = format!("/api/jobs/{}", job["id"]);

    let (status, _) = server
        .send(reqwest::Method::PUT, &path, &other, json!({ "title": "Mine now" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(server.delete(&path, &other).await?, StatusCode::FORBIDDEN);
    assert_eq!(server.delete(&path, &recruiter).await?, StatusCode::NO_CONTENT);
    let (status, _) = server.get(&path, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn whitespace_titles_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let recruiter = server.register("recruiter@example.com", "recruiter").await?;
    let company = server.create_company(&recruiter, "Acme").await?;

    let (status, body) = server
        .post(
            "/api/jobs",
            &recruiter,
            json!({
                "companyId": company["id"],
                "title": "   ",
                "description": "Build services",
                "jobType": "full_time",
                "experienceLevel": "mid",
                "location": "Remote",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "title");

    let job = server.create_job(&recruiter, company["id"].as_i64().unwrap(), "Engineer").await?;
    let path = format!("/api/jobs/{}", job["id"]);
    let (status, body) = server
        .send(reqwest::Method::PUT, &path, &recruiter, json!({ "title": "  " }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "title");
    Ok(())
}

#[tokio::test]
async fn oversized_salaries_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let recruiter = server.register("recruiter@example.com", "recruiter").await?;
    let company = server.create_company(&recruiter, "Acme").await?;

    let (status, body) = server
        .post(
            "/api/jobs",
            &recruiter,
            json!({
                "companyId": company["id"],
                "title": "Engineer",
                "description": "Build services",
                "jobType": "full_time",
                "experienceLevel": "mid",
                "location": "Remote",
                "salaryMin": 1_000_000_000_000u64,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "salaryMin");
    Ok(())
}

#[tokio::test]
async fn mistyped_fields_are_named() -> Result<()> {
    let server = TestServer::spawn().await?;
    let recruiter = server.register("recruiter@example.com", "recruiter").await?;
    let company = server.create_company(&recruiter, "Acme").await?;

    let (status, body) = server
        .post(
            "/api/jobs",
            &recruiter,
            json!({
                "companyId": company["id"],
                "title": "Engineer",
                "description": "Build services",
                "jobType": "gig",
                "experienceLevel": "mid",
                "location": "Remote",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"][0]["field"], "jobType");
    assert!(body["errors"][0]["message"].as_str().unwrap().contains("gig"));
    Ok(())
}
