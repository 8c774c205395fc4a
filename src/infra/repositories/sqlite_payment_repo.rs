use crate::domain::models::payment::{Payment, PaymentMethod, PaymentStatus, RefundRequest, RefundStatus};
use crate::domain::ports::PaymentRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqlitePaymentRepo {
    pool: SqlitePool,
}

impl SqlitePaymentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepo {
    async fn create_method(&self, method: &PaymentMethod) -> Result<PaymentMethod, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        if method.is_default {
            sqlx::query("UPDATE payment_methods SET is_default = 0 WHERE owner_id = ?")
                .bind(&method.owner_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        let created = sqlx::query_as::<_, PaymentMethod>(
            "INSERT INTO payment_methods (id, owner_id, kind, last4, brand, expiry_month, expiry_year, is_default, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
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
        sqlx::query_as::<_, PaymentMethod>("SELECT * FROM payment_methods WHERE owner_id = ? AND id = ?").bind(owner_id).bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_methods(&self, owner_id: &str) -> Result<Vec<PaymentMethod>, AppError> {
        sqlx::query_as::<_, PaymentMethod>("SELECT * FROM payment_methods WHERE owner_id = ? ORDER BY created_at ASC").bind(owner_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_payment(&self, id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_completed_by_booking(&self, booking_id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE booking_id = ? AND status = ?").bind(booking_id).bind(PaymentStatus::Completed).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_payer(&self, payer_id: &str) -> Result<Vec<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE payer_id = ? ORDER BY created_at DESC").bind(payer_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn create_refund(&self, refund: &RefundRequest) -> Result<RefundRequest, AppError> {
        sqlx::query_as::<_, RefundRequest>(
            "INSERT INTO refund_requests (id, payment_id, amount, reason, status, requested_at, processed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
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
             WHERE p.payer_id = ?
             ORDER BY rr.requested_at DESC"
        ).bind(payer_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_pending_refunds(&self, limit: i32) -> Result<Vec<RefundRequest>, AppError> {
        sqlx::query_as::<_, RefundRequest>("SELECT * FROM refund_requests WHERE status = ? ORDER BY requested_at ASC LIMIT ?")
            .bind(RefundStatus::Pending).bind(limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn settle_refund(&self, refund_id: &str, status: RefundStatus) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("UPDATE refund_requests SET status = ?, processed_at = ? WHERE id = ?")
            .bind(status).bind(Utc::now()).bind(refund_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if status == RefundStatus::Completed {
            sqlx::query(
                "UPDATE payments SET status = ? WHERE id = (SELECT payment_id FROM refund_requests WHERE id = ?)"
            )
                .bind(PaymentStatus::Refunded).bind(refund_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
