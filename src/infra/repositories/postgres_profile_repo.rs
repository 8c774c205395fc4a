use crate::domain::{models::user::User, ports::ProfileRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresProfileRepo {
    pool: PgPool,
}

impl PostgresProfileRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO profiles (id, email, password_hash, first_name, last_name, role, phone, profile_image, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *"
        )
            .bind(&user.id).bind(&user.email).bind(&user.password_hash)
            .bind(&user.first_name).bind(&user.last_name).bind(user.role)
            .bind(&user.phone).bind(&user.profile_image).bind(user.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM profiles WHERE email = $1").bind(email).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM profiles WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "UPDATE profiles SET first_name = $1, last_name = $2, phone = $3, profile_image = $4
             WHERE id = $5
             RETURNING *"
        )
            .bind(&user.first_name).bind(&user.last_name).bind(&user.phone).bind(&user.profile_image)
            .bind(&user.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
