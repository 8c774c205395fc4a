use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::models::user::UserRole;

/// Immutable after creation except for the read flag, which flips via the
/// bulk mark-as-read operation.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Message {
    pub id: String,
    pub ride_id: String,
    pub sender_id: String,
    pub sender_role: UserRole,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(ride_id: String, sender_id: String, sender_role: UserRole, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ride_id,
            sender_id,
            sender_role,
            content,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
