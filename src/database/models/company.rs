use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Admin-controlled lifecycle shared by companies and vendors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "approval_status", rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub logo_url: Option<String>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    #[validate(required, length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub industry: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompany {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub industry: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

/// PATCH .../status body for companies and vendors
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApprovalStatusUpdate {
    #[validate(required)]
    pub status: Option<ApprovalStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
    pub query: Option<String>,
    pub status: Option<ApprovalStatus>,
    pub limit: i64,
}
