#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use jobboard_api::auth::{hash_password, issue_token};
use jobboard_api::config::AppConfig;
use jobboard_api::database::models::{NewUserRecord, UserType};
use jobboard_api::database::{MemoryStorage, Storage};
use jobboard_api::geo::Geography;
use jobboard_api::state::AppState;

/// The real router over in-memory storage, listening on a free local port
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub config: AppConfig,
    pub storage: Arc<MemoryStorage>,
    pub uploads: TempDir,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub token: String,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let uploads = tempfile::tempdir().context("failed to create upload dir")?;
        let mut config = AppConfig::development();
        config.uploads.dir = uploads.path().to_path_buf();

        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::new(config.clone(), storage.clone(), Geography::embedded()?);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, jobboard_api::app(state)).await;
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: Client::new(),
            config,
            storage,
            uploads,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, email: &str, user_type: &str) -> Result<Session> {
        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "email": email,
                "password": "correct-horse-battery",
                "firstName": "Test",
                "lastName": "User",
                "userType": user_type,
            }))
            .send()
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::CREATED, "register failed: {}", resp.status());
        let body: Value = resp.json().await?;
        Ok(Session {
            id: body["user"]["id"].as_i64().context("missing user id")?,
            token: body["token"].as_str().context("missing token")?.to_string(),
        })
    }

    /// Admins cannot self-register, so create one directly in storage
    pub async fn admin(&self) -> Result<Session> {
        let user = self
            .storage
            .create_user(NewUserRecord {
                email: format!("admin{}@example.com", self.storage.operations()),
                password_hash: hash_password("admin-password")?,
                first_name: "Site".into(),
                last_name: "Admin".into(),
                user_type: UserType::Admin,
            })
            .await?;
        Ok(Session {
            id: user.id as i64,
            token: issue_token(&self.config.security, &user)?,
        })
    }

    pub async fn get(&self, path: &str, session: Option<&Session>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.get(self.url(path));
        if let Some(session) = session {
            req = req.bearer_auth(&session.token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        Ok((status, resp.json().await.unwrap_or(Value::Null)))
    }

    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        session: &Session,
        body: Value,
    ) -> Result<(StatusCode, Value)> {
        let resp = self
            .client
            .request(method, self.url(path))
            .bearer_auth(&session.token)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        Ok((status, resp.json().await.unwrap_or(Value::Null)))
    }

    pub async fn post(&self, path: &str, session: &Session, body: Value) -> Result<(StatusCode, Value)> {
        self.send(reqwest::Method::POST, path, session, body).await
    }

    pub async fn patch(&self, path: &str, session: &Session, body: Value) -> Result<(StatusCode, Value)> {
        self.send(reqwest::Method::PATCH, path, session, body).await
    }

    pub async fn delete(&self, path: &str, session: &Session) -> Result<StatusCode> {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(&session.token)
            .send()
            .await?;
        Ok(resp.status())
    }

    pub async fn create_company(&self, owner: &Session, name: &str) -> Result<Value> {
        let (status, body) = self
            .post(
                "/api/companies",
                owner,
                json!({ "name": name, "industry": "Software", "location": "Austin, TX" }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create company failed: {} {}", status, body);
        Ok(body)
    }

    pub async fn approve_company(&self, admin: &Session, id: i64) -> Result<Value> {
        let (status, body) = self
            .patch(&format!("/api/companies/{}/status", id), admin, json!({ "status": "approved" }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "approve failed: {} {}", status, body);
        Ok(body)
    }

    pub async fn create_job(&self, poster: &Session, company_id: i64, title: &str) -> Result<Value> {
        let (status, body) = self
            .post(
                "/api/jobs",
                poster,
                json!({
                    "companyId": company_id,
                    "title": title,
                    "description": "Design and build backend services",
                    "jobType": "full_time",
                    "experienceLevel": "mid",
                    "location": "Remote",
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create job failed: {} {}", status, body);
        Ok(body)
    }
}
