use crate::domain::models::booking::BookingStatus;
use crate::domain::models::payment::{Payment, PaymentStatus, RefundRequest};
use crate::domain::models::ride::{LiveLocation, Ride, RideStatus, SearchFilters};
use crate::domain::ports::RideRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub struct SqliteRideRepo {
    pool: SqlitePool,
}

impl SqliteRideRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RideRepository for SqliteRideRepo {
    async fn create(&self, ride: &Ride) -> Result<Ride, AppError> {
        sqlx::query_as::<_, Ride>(
            "INSERT INTO rides (id, driver_id,
                from_address, from_city, from_country, from_latitude, from_longitude,
                to_address, to_city, to_country, to_latitude, to_longitude,
                departure_date, departure_time, available_seats, price_per_seat, description,
                status, is_location_sharing_enabled, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&ride.id).bind(&ride.driver_id)
            .bind(&ride.from_address).bind(&ride.from_city).bind(&ride.from_country).bind(ride.from_latitude).bind(ride.from_longitude)
            .bind(&ride.to_address).bind(&ride.to_city).bind(&ride.to_country).bind(ride.to_latitude).bind(ride.to_longitude)
            .bind(ride.departure_date).bind(&ride.departure_time).bind(ride.available_seats).bind(ride.price_per_seat).bind(&ride.description)
            .bind(ride.status).bind(ride.is_location_sharing_enabled).bind(ride.created_at).bind(ride.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Ride>, AppError> {
        sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_driver(&self, driver_id: &str) -> Result<Vec<Ride>, AppError> {
        sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE driver_id = ? ORDER BY departure_date ASC, departure_time ASC").bind(driver_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Ride>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT r.* FROM rides r WHERE r.status = ");
        qb.push_bind(RideStatus::Active);
        qb.push(" AND r.departure_date >= ");
        qb.push_bind(Utc::now().date_naive());

        if let Some(from) = &filters.from {
            qb.push(" AND LOWER(r.from_city) LIKE '%' || LOWER(");
            qb.push_bind(from);
            qb.push(") || '%'");
        }
        if let Some(to) = &filters.to {
            qb.push(" AND LOWER(r.to_city) LIKE '%' || LOWER(");
            qb.push_bind(to);
            qb.push(") || '%'");
        }
        if let Some(date) = filters.date {
            qb.push(" AND r.departure_date = ");
            qb.push_bind(date);
        }
        if let Some(min_price) = filters.min_price {
            qb.push(" AND r.price_per_seat >= ");
            qb.push_bind(min_price);
        }
        if let Some(max_price) = filters.max_price {
            qb.push(" AND r.price_per_seat <= ");
            qb.push_bind(max_price);
        }
        if let Some(seats) = filters.seats {
            qb.push(" AND (r.available_seats - COALESCE((SELECT SUM(b.seats_booked) FROM bookings b WHERE b.ride_id = r.id AND b.status = 'confirmed'), 0)) >= ");
            qb.push_bind(seats);
        }
        qb.push(" ORDER BY r.departure_date ASC, r.departure_time ASC");

        qb.build_query_as::<Ride>().fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn transition_status(&self, id: &str, from: &[RideStatus], to: RideStatus) -> Result<Ride, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE rides SET status = ");
        qb.push_bind(to);
        qb.push(", updated_at = ");
        qb.push_bind(Utc::now());
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" AND status IN (");
        let mut separated = qb.separated(", ");
        for status in from {
            separated.push_bind(*status);
        }
        qb.push(") RETURNING *");

        let updated = qb.build_query_as::<Ride>().fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        match updated {
            Some(ride) => Ok(ride),
            None => {
                self.find_by_id(id).await?
                    .ok_or(AppError::NotFound("Ride not found".into()))?;
                Err(AppError::Conflict("Invalid ride status transition".into()))
            }
        }
    }

    async fn complete(&self, id: &str) -> Result<Ride, AppError> {
        let updated = sqlx::query_as::<_, Ride>(
            "UPDATE rides SET status = ?,
                live_location_latitude = NULL, live_location_longitude = NULL,
                live_location_accuracy = NULL, live_location_timestamp = NULL,
                is_location_sharing_enabled = 0, updated_at = ?
             WHERE id = ? AND status = ?
             RETURNING *"
        )
            .bind(RideStatus::Completed).bind(Utc::now()).bind(id).bind(RideStatus::InProgress)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;

        match updated {
            Some(ride) => Ok(ride),
            None => {
                self.find_by_id(id).await?
                    .ok_or(AppError::NotFound("Ride not found".into()))?;
                Err(AppError::Conflict("Only a ride in progress can be completed".into()))
            }
        }
    }

    async fn cancel_with_bookings(&self, id: &str, refund_reason: &str) -> Result<Ride, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let cancelled = sqlx::query_as::<_, Ride>(
            "UPDATE rides SET status = ?, updated_at = ? WHERE id = ? AND status IN ('active', 'full') RETURNING *"
        )
            .bind(RideStatus::Cancelled).bind(Utc::now()).bind(id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Ride can no longer be cancelled".into()))?;

        // Settled payments are read inside the transaction, before the
        // bookings flip, so every booking voided here gets its refund.
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT p.* FROM payments p
             JOIN bookings b ON b.id = p.booking_id
             WHERE b.ride_id = ? AND b.status = ? AND p.status = ?"
        )
            .bind(id).bind(BookingStatus::Confirmed).bind(PaymentStatus::Completed)
            .fetch_all(&mut *tx).await.map_err(AppError::Database)?;

        sqlx::query("UPDATE bookings SET status = ? WHERE ride_id = ? AND status = ?")
            .bind(BookingStatus::Cancelled).bind(id).bind(BookingStatus::Confirmed)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        for payment in payments {
            let refund = RefundRequest::new(payment.id, payment.amount, refund_reason.to_string());
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

    async fn update_live_location(&self, id: &str, location: &LiveLocation) -> Result<Ride, AppError> {
        sqlx::query_as::<_, Ride>(
            "UPDATE rides SET live_location_latitude = ?, live_location_longitude = ?,
                live_location_accuracy = ?, live_location_timestamp = ?, updated_at = ?
             WHERE id = ?
             RETURNING *"
        )
            .bind(location.latitude).bind(location.longitude)
            .bind(location.accuracy).bind(location.timestamp).bind(Utc::now())
            .bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_location_sharing(&self, id: &str, enabled: bool) -> Result<Ride, AppError> {
        sqlx::query_as::<_, Ride>(
            "UPDATE rides SET is_location_sharing_enabled = ?, updated_at = ? WHERE id = ? RETURNING *"
        )
            .bind(enabled).bind(Utc::now()).bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
