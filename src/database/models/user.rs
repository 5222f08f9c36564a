use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_type", rename_all = "snake_case")]
pub enum UserType {
    #[default]
    JobSeeker,
    Recruiter,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::JobSeeker => "job_seeker",
            UserType::Recruiter => "recruiter",
            UserType::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/auth/register body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub user_type: Option<UserType>,
}

/// POST /api/auth/login body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

/// PUT /api/users/me body; absent fields are left untouched
#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 200))]
    pub headline: Option<String>,
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

/// Insert shape for users; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
}
