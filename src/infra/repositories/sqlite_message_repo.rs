use crate::domain::{models::message::Message, ports::MessageRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteMessageRepo {
    pool: SqlitePool,
}

impl SqliteMessageRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepo {
    async fn create(&self, message: &Message) -> Result<Message, AppError> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, ride_id, sender_id, sender_role, content, is_read, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&message.id).bind(&message.ride_id).bind(&message.sender_id)
            .bind(message.sender_role).bind(&message.content).bind(message.is_read).bind(message.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_ride(&self, ride_id: &str) -> Result<Vec<Message>, AppError> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE ride_id = ? ORDER BY created_at ASC").bind(ride_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn mark_read(&self, ride_id: &str, viewer_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE messages SET is_read = 1 WHERE ride_id = ? AND sender_id != ? AND is_read = 0")
            .bind(ride_id).bind(viewer_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
