// handlers/mod.rs - one module per resource
//
// Every handler follows the same shape: extractors reject malformed or
// unauthenticated requests, then one or two storage calls, then JSON.

pub mod applications;
pub mod auth;
pub mod companies;
pub mod connections;
pub mod geography;
pub mod groups;
pub mod health;
pub mod jobs;
pub mod messages;
pub mod search;
pub mod users;
pub mod vendors;

use serde::Deserialize;

/// `?q=&limit=` accepted by the list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}
