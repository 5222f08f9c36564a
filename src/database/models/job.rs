use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "job_type", rename_all = "snake_case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "experience_level", rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Entry,
    Mid,
    Senior,
    Lead,
    Executive,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub company_id: i32,
    pub posted_by: i32,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub location: String,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    #[validate(required, range(min = 1))]
    pub company_id: Option<i32>,
    #[validate(required, length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(required, length(min = 1, max = 20000))]
    pub description: Option<String>,
    #[validate(length(max = 20000))]
    pub requirements: Option<String>,
    #[validate(required)]
    pub job_type: Option<JobType>,
    #[validate(required)]
    pub experience_level: Option<ExperienceLevel>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJob {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 20000))]
    pub description: Option<String>,
    #[validate(length(max = 20000))]
    pub requirements: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Insert shape for jobs with the location already resolved
#[derive(Debug, Clone)]
pub struct NewJobRecord {
    pub company_id: i32,
    pub posted_by: i32,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub location: String,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub query: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub location: Option<String>,
    pub company_id: Option<i32>,
    pub active_only: bool,
    pub limit: i64,
}

/// Join the non-blank city, state and country parts: "Austin, TX, US"
pub fn compose_location(city: Option<&str>, state: Option<&str>, country: Option<&str>) -> String {
    [city, state, country]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// An explicit non-blank location wins over the composed one
pub fn resolve_location(
    location: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
    country: Option<&str>,
) -> String {
    match location.map(str::trim).filter(|l| !l.is_empty()) {
        Some(explicit) => explicit.to_string(),
        None => compose_location(city, state, country),
    }
}

impl NewJob {
    /// Convert a payload that already passed `validate()` into an insert record
    pub fn into_record(self, posted_by: i32) -> NewJobRecord {
        let location = resolve_location(
            self.location.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.country.as_deref(),
        );
        NewJobRecord {
            company_id: self.company_id.unwrap_or_default(),
            posted_by,
            title: self.title.unwrap_or_default().trim().to_string(),
            description: self.description.unwrap_or_default(),
            requirements: self.requirements,
            job_type: self.job_type.unwrap_or_default(),
            experience_level: self.experience_level.unwrap_or_default(),
            city: self.city,
            state: self.state,
            country: self.country,
            location,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            is_active: self.is_active.unwrap_or(true),
        }
    }
}
