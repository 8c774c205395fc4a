use crate::domain::{models::user::User, ports::ProfileRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteProfileRepo {
    pool: SqlitePool,
}

impl SqliteProfileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO profiles (id, email, password_hash, first_name, last_name, role, phone, profile_image, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&user.id).bind(&user.email).bind(&user.password_hash)
            .bind(&user.first_name).bind(&user.last_name).bind(user.role)
            .bind(&user.phone).bind(&user.profile_image).bind(user.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM profiles WHERE email = ?").bind(email).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM profiles WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "UPDATE profiles SET first_name = ?, last_name = ?, phone = ?, profile_image = ?
             WHERE id = ?
             RETURNING *"
        )
            .bind(&user.first_name).bind(&user.last_name).bind(&user.phone).bind(&user.profile_image)
            .bind(&user.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
