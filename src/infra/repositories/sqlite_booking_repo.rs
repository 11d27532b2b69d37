use crate::domain::{models::booking::{Booking, BookingService, BookingStats}, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, Utc};

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
    async fn create(&self, booking: &Booking, services: &[BookingService]) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, reference, customer_id, hotel_id, staff_id, status, payment_status, provider_preference, recipient_count, address, scheduled_at, total_price, final_price, cancelled_at, cancellation_reason, refund_amount, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.reference).bind(&booking.customer_id).bind(&booking.hotel_id)
            .bind(&booking.staff_id).bind(&booking.status).bind(&booking.payment_status).bind(&booking.provider_preference)
            .bind(booking.recipient_count).bind(&booking.address).bind(booking.scheduled_at).bind(booking.total_price)
            .bind(booking.final_price).bind(booking.cancelled_at).bind(&booking.cancellation_reason).bind(booking.refund_amount)
            .bind(booking.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        for line in services {
            sqlx::query("INSERT INTO booking_services (id, booking_id, recipient_index, service_name, price, duration_min) VALUES (?, ?, ?, ?, ?, ?)")
                .bind(&line.id).bind(&line.booking_id).bind(line.recipient_index)
                .bind(&line.service_name).bind(line.price).bind(line.duration_min)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, status: Option<&str>) -> Result<Vec<Booking>, AppError> {
        let query = if status.is_some() {
            "SELECT * FROM bookings WHERE status = ? ORDER BY scheduled_at ASC"
        } else {
            "SELECT * FROM bookings ORDER BY scheduled_at ASC"
        };
        let mut q = sqlx::query_as::<_, Booking>(query);
        if let Some(s) = status {
            q = q.bind(s);
        }
        q.fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_services(&self, booking_id: &str) -> Result<Vec<BookingService>, AppError> {
        sqlx::query_as::<_, BookingService>("SELECT * FROM booking_services WHERE booking_id = ? ORDER BY recipient_index ASC")
            .bind(booking_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn confirm_with_staff(&self, id: &str, staff_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE bookings SET status = 'confirmed', staff_id = ? WHERE id = ? AND status != 'cancelled'")
            .bind(staff_id).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn update_status(&self, id: &str, status: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn set_payment_status(&self, id: &str, payment_status: &str, refund_amount: Option<i64>) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE bookings SET payment_status = ?, refund_amount = COALESCE(?, refund_amount) WHERE id = ?")
            .bind(payment_status).bind(refund_amount).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn cancel(&self, id: &str, reason: &str, refund_amount: Option<i64>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'cancelled', cancelled_at = ?, cancellation_reason = ?, refund_amount = ? WHERE id = ? AND status != 'cancelled'"
        )
            .bind(Utc::now()).bind(reason).bind(refund_amount).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn find_confirmed_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE status = 'confirmed' AND scheduled_at > ?")
            .bind(now).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn stats(&self) -> Result<BookingStats, AppError> {
        sqlx::query_as::<_, BookingStats>(
            "SELECT COUNT(*) AS total,
                    COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending,
                    COALESCE(SUM(CASE WHEN status = 'confirmed' THEN 1 ELSE 0 END), 0) AS confirmed,
                    COALESCE(SUM(CASE WHEN status = 'in_progress' THEN 1 ELSE 0 END), 0) AS in_progress,
                    COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) AS completed,
                    COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0) AS cancelled,
                    COALESCE(SUM(final_price), 0) AS total_revenue
             FROM bookings"
        )
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
