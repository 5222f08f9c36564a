//! Request extractors that turn malformed input into 400 responses before any
//! handler logic runs.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult, FieldError};

/// JSON body that has passed its `Validate` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate().map_err(validation_error)?;
        Ok(ValidatedJson(value))
    }
}

/// `Path` whose rejection is a JSON 400 (e.g. `/api/jobs/abc`)
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `Query` whose rejection is a JSON 400
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Convert validator output into the public `{field, message}` list
pub fn validation_error(errors: ValidationErrors) -> ApiError {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let name = camel_case(&field.to_string());
            errs.iter()
                .map(move |err| FieldError::new(name.clone(), describe(err)))
                .collect::<Vec<_>>()
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    ApiError::validation(fields)
}

fn describe(err: &ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }
    let param = |key: &str| err.params.get(key).map(|v| v.to_string());
    match err.code.as_ref() {
        "required" => "This field is required".to_string(),
        "email" => "Must be a valid email address".to_string(),
        "url" => "Must be a valid URL".to_string(),
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("Must be between {} and {} characters", min, max),
            (Some(min), None) => format!("Must be at least {} characters", min),
            (None, Some(max)) => format!("Must be at most {} characters", max),
            (None, None) => "Invalid length".to_string(),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("Must be between {} and {}", min, max),
            (Some(min), None) => format!("Must be at least {}", min),
            (None, Some(max)) => format!("Must be at most {}", max),
            (None, None) => "Out of range".to_string(),
        },
        other => format!("Invalid value ({})", other),
    }
}

/// `salary_max` -> `salaryMax`
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Validate a client `limit` (must be positive) and clamp it to the configured cap
pub fn resolve_limit(config: &AppConfig, requested: Option<i64>) -> ApiResult<i64> {
    match requested {
        Some(n) if n < 1 => Err(ApiError::invalid_field("limit", "Must be a positive integer")),
        other => Ok(config.clamp_limit(other)),
    }
}

/// Unwrap a field that `#[validate(required)]` already checked
pub fn required<T>(value: Option<T>, field: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::invalid_field(field, "This field is required"))
}

/// Trimmed value of a required text field; blank counts as missing
pub fn required_text(value: Option<String>, field: &str) -> ApiResult<String> {
    let text = required(value, field)?.trim().to_string();
    if text.is_empty() {
        return Err(ApiError::invalid_field(field, "This field is required"));
    }
    Ok(text)
}

/// Trimmed value of an optional text update that may not be cleared
pub fn non_blank(value: Option<String>, field: &str) -> ApiResult<Option<String>> {
    value.map(|v| required_text(Some(v), field)).transpose()
}

/// Trim a free-text query, treating blank input as absent
pub fn normalize_query(q: Option<&str>) -> Option<String> {
    q.map(str::trim).filter(|q| !q.is_empty()).map(str::to_string)
}
