use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::company::ApprovalStatus;

/// A service provider attached to a client company
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: i32,
    pub company_id: i32,
    pub created_by: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub services: Option<String>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVendor {
    #[validate(required, range(min = 1))]
    pub company_id: Option<i32>,
    #[validate(required, length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 5000))]
    pub services: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VendorFilter {
    pub status: Option<ApprovalStatus>,
    pub company_id: Option<i32>,
    pub limit: i64,
}
