use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::payment::{Payment, RefundRequest};
use crate::domain::models::ride::{Ride, RideStatus};
use crate::domain::ports::BookingRepository;
use crate::domain::services::lifecycle;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_with_payment(&self, booking: &Booking, payment: &Payment) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Touching the ride row first takes SQLite's write lock up front, so
        // a racing booking on the same ride serializes here (the Postgres
        // variant uses FOR UPDATE for the same effect) instead of failing a
        // deferred lock upgrade with SQLITE_BUSY.
        sqlx::query("UPDATE rides SET updated_at = updated_at WHERE id = ?")
            .bind(&booking.ride_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        // Re-check capacity inside the transaction; the handler's pre-check
        // can race with another booking on the same ride.
        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = ?")
            .bind(&booking.ride_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Ride not found".into()))?;

        if ride.status != RideStatus::Active {
            return Err(AppError::Conflict("Ride is not accepting bookings".into()));
        }

        let confirmed: i64 = sqlx::query(
            "SELECT COALESCE(SUM(seats_booked), 0) AS total FROM bookings WHERE ride_id = ? AND status = ?"
        )
            .bind(&booking.ride_id).bind(BookingStatus::Confirmed)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?
            .get("total");

        if confirmed + booking.seats_booked as i64 > ride.available_seats as i64 {
            return Err(AppError::Conflict("Not enough seats available".into()));
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, ride_id, passenger_id, seats_booked, total_price, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.ride_id).bind(&booking.passenger_id)
            .bind(booking.seats_booked).bind(booking.total_price).bind(booking.status).bind(booking.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        sqlx::query(
            "INSERT INTO payments (id, booking_id, ride_id, payer_id, amount, currency, status, payment_method_id, gateway_reference, created_at, completed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
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
        sqlx::query("UPDATE rides SET status = ?, updated_at = ? WHERE id = ?")
            .bind(next_status).bind(Utc::now()).bind(&booking.ride_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_ride(&self, ride_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE ride_id = ? ORDER BY created_at ASC").bind(ride_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_passenger(&self, passenger_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE passenger_id = ? ORDER BY created_at DESC").bind(passenger_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel(&self, booking: &Booking, refund: Option<&RefundRequest>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let cancelled = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = ? WHERE id = ? AND status = ? RETURNING *"
        )
            .bind(BookingStatus::Cancelled).bind(&booking.id).bind(BookingStatus::Confirmed)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Booking is already cancelled".into()))?;

        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = ?")
            .bind(&booking.ride_id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        let confirmed: i64 = sqlx::query(
            "SELECT COALESCE(SUM(seats_booked), 0) AS total FROM bookings WHERE ride_id = ? AND status = ?"
        )
            .bind(&booking.ride_id).bind(BookingStatus::Confirmed)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?
            .get("total");

        let next_status = lifecycle::capacity_status(ride.status, confirmed as i32, ride.available_seats);
        sqlx::query("UPDATE rides SET status = ?, updated_at = ? WHERE id = ?")
            .bind(next_status).bind(Utc::now()).bind(&booking.ride_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        if let Some(refund) = refund {
            sqlx::query(
                "INSERT INTO refund_requests (id, payment_id, amount, reason, status, requested_at, processed_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)"
            )
                .bind(&refund.id).bind(&refund.payment_id).bind(refund.amount).bind(&refund.reason)
                .bind(refund.status).bind(refund.requested_at).bind(refund.processed_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(cancelled)
    }
}
