use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "connection_status", rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// Undirected relationship between two users; the requester is whoever asked first
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: i32,
    pub requester_id: i32,
    pub addressee_id: i32,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    pub fn involves(&self, user_id: i32) -> bool {
        self.requester_id == user_id || self.addressee_id == user_id
    }

    /// The other side of the connection as seen from `user_id`
    pub fn peer_of(&self, user_id: i32) -> i32 {
        if self.requester_id == user_id {
            self.addressee_id
        } else {
            self.requester_id
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    #[validate(required, range(min = 1))]
    pub addressee_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConnectionStatusUpdate {
    #[validate(required)]
    pub status: Option<ConnectionStatus>,
}
