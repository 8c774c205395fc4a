use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::payment::{Payment, RefundRequest};
use crate::domain::models::ride::{Ride, RideStatus};
use crate::domain::ports::BookingRepository;
use crate::domain::services::lifecycle;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_with_payment(&self, booking: &Booking, payment: &Payment) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Row lock serializes concurrent bookings on the same ride, so the
        // seat re-check below sees committed sums only.
        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1 FOR UPDATE")
            .bind(&booking.ride_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Ride not found".into()))?;

        if ride.status != RideStatus::Active {
            return Err(AppError::Conflict("Ride is not accepting bookings".into()));
        }

        let confirmed: i64 = sqlx::query(
            "SELECT COALESCE(SUM(seats_booked), 0) AS total FROM bookings WHERE ride_id = $1 AND status = $2"
        )
            .bind(&booking.ride_id).bind(BookingStatus::Confirmed)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?
            .get("total");

        if confirmed + booking.seats_booked as i64 > ride.available_seats as i64 {
            return Err(AppError::Conflict("Not enough seats available".into()));
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, ride_id, passenger_id, seats_booked, total_price, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.ride_id).bind(&booking.passenger_id)
            .bind(booking.seats_booked).bind(booking.total_price).bind(booking.status).bind(booking.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        sqlx::query(
            "INSERT INTO payments (id, booking_id, ride_id, payer_id, amount, currency, status, payment_method_id, gateway_reference, created_at, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        )
            .bind(&payment.id).bind(&payment.booking_id).bind(&payment.ride_id).bind(&payment.payer_id)
            .bind(payment.amount).bind(&payment.currency).bind(payment.status)
            .bind(&payment.payment_method_id).bind(&payment.gateway_reference)
            .bind(payment.created_at).bind(payment.completed_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let next_status = lifecycle::capacity_status(
            ride.status,
            confirmed as i32 + booking.seats_booked,
            ride.available_seats,
        );
        sqlx::query("UPDATE rides SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(next_status).bind(Utc::now()).bind(&booking.ride_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_ride(&self, ride_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE ride_id = $1 ORDER BY created_at ASC").bind(ride_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_passenger(&self, passenger_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE passenger_id = $1 ORDER BY created_at DESC").bind(passenger_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel(&self, booking: &Booking, refund: Option<&RefundRequest>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let cancelled = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $1 WHERE id = $2 AND status = $3 RETURNING *"
        )
            .bind(BookingStatus::Cancelled).bind(&booking.id).bind(BookingStatus::Confirmed)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Booking is already cancelled".into()))?;

        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1 FOR UPDATE")
            .bind(&booking.ride_id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        let confirmed: i64 = sqlx::query(
            "SELECT COALESCE(SUM(seats_booked), 0) AS total FROM bookings WHERE ride_id = $1 AND status = $2"
        )
            .bind(&booking.ride_id).bind(BookingStatus::Confirmed)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?
            .get("total");

        let next_status = lifecycle::capacity_status(ride.status, confirmed as i32, ride.available_seats);
        sqlx::query("UPDATE rides SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(next_status).bind(Utc::now()).bind(&booking.ride_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        if let Some(refund) = refund {
            sqlx::query(
                "INSERT INTO refund_requests (id, payment_id, amount, reason, status, requested_at, processed_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)"
            )
                .bind(&refund.id).bind(&refund.payment_id).bind(refund.amount).bind(&refund.reason)
                .bind(refund.status).bind(refund.requested_at).bind(refund.processed_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(cancelled)
    }
}
