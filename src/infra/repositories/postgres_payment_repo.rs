use crate::domain::models::payment::{Payment, PaymentMethod, PaymentStatus, RefundRequest, RefundStatus};
use crate::domain::ports::PaymentRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresPaymentRepo {
    pool: PgPool,
}

impl PostgresPaymentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepo {
    async fn create_method(&self, method: &PaymentMethod) -> Result<PaymentMethod, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        if method.is_default {
            sqlx::query("UPDATE payment_methods SET is_default = FALSE WHERE owner_id = $1")
                .bind(&method.owner_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        let created = sqlx::query_as::<_, PaymentMethod>(
            "INSERT INTO payment_methods (id, owner_id, kind, last4, brand, expiry_month, expiry_year, is_default, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *"
        )
            .bind(&method.id).bind(&method.owner_id).bind(method.kind)
            .bind(&method.last4).bind(&method.brand).bind(method.expiry_month).bind(method.expiry_year)
            .bind(method.is_default).bind(method.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }
    async fn find_method(&self, owner_id: &str, id: &str) -> Result<Option<PaymentMethod>, AppError> {
        sqlx::query_as::<_, PaymentMethod>("SELECT * FROM payment_methods WHERE owner_id = $1 AND id = $2").bind(owner_id).bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_methods(&self, owner_id: &str) -> Result<Vec<PaymentMethod>, AppError> {
        sqlx::query_as::<_, PaymentMethod>("SELECT * FROM payment_methods WHERE owner_id = $1 ORDER BY created_at ASC").bind(owner_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_payment(&self, id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_completed_by_booking(&self, booking_id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE booking_id = $1 AND status = $2").bind(booking_id).bind(PaymentStatus::Completed).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_payer(&self, payer_id: &str) -> Result<Vec<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE payer_id = $1 ORDER BY created_at DESC").bind(payer_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn create_refund(&self, refund: &RefundRequest) -> Result<RefundRequest, AppError> {
        sqlx::query_as::<_, RefundRequest>(
            "INSERT INTO refund_requests (id, payment_id, amount, reason, status, requested_at, processed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
            .bind(&refund.id).bind(&refund.payment_id).bind(refund.amount).bind(&refund.reason)
            .bind(refund.status).bind(refund.requested_at).bind(refund.processed_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_refunds_by_payer(&self, payer_id: &str) -> Result<Vec<RefundRequest>, AppError> {
        sqlx::query_as::<_, RefundRequest>(
            "SELECT rr.* FROM refund_requests rr
             JOIN payments p ON p.id = rr.payment_id
             WHERE p.payer_id = $1
             ORDER BY rr.requested_at DESC"
        ).bind(payer_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_pending_refunds(&self, limit: i32) -> Result<Vec<RefundRequest>, AppError> {
        sqlx::query_as::<_, RefundRequest>("SELECT * FROM refund_requests WHERE status = $1 ORDER BY requested_at ASC LIMIT $2")
            .bind(RefundStatus::Pending).bind(limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn settle_refund(&self, refund_id: &str, status: RefundStatus) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("UPDATE refund_requests SET status = $1, processed_at = $2 WHERE id = $3")
            .bind(status).bind(Utc::now()).bind(refund_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if status == RefundStatus::Completed {
            sqlx::query(
                "UPDATE payments SET status = $1 WHERE id = (SELECT payment_id FROM refund_requests WHERE id = $2)"
            )
                .bind(PaymentStatus::Refunded).bind(refund_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
