//! Repositorio de reservas
//!
//! La operación clave es `create_reserved`: el chequeo de conflicto y el
//! insert corren en una sola transacción con lock de fila sobre el coche,
//! así dos createBooking concurrentes sobre el mismo coche se serializan
//! y el perdedor recibe Conflict en vez de colarse (reserve con
//! accept/reject definitivo).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::booking::{compute_total_amount, Booking};
use crate::models::car::Car;
use crate::utils::errors::AppError;

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_reserved(
        &self,
        user_id: Uuid,
        car_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        pickup_location: String,
        dropoff_location: String,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock de fila: serializa las reservas concurrentes de este coche
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1 FOR UPDATE")
            .bind(car_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        if !car.is_available {
            return Err(AppError::BadRequest("Car is not available".to_string()));
        }

        // Conflicto con reservas confirmed/active, intervalos semiabiertos
        let conflict: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE car_id = $1
                  AND status IN ('confirmed', 'active')
                  AND start_date < $3 AND end_date > $2
            )
            "#,
        )
        .bind(car_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&mut *tx)
        .await?;

        if conflict.0 {
            return Err(AppError::Conflict(
                "Car is already booked for the selected dates".to_string(),
            ));
        }

        let total_amount = compute_total_amount(start_date, end_date, car.daily_rate);

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, car_id, user_id, start_date, end_date, pickup_location, dropoff_location, total_amount, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(car_id)
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .bind(pickup_location)
        .bind(dropoff_location)
        .bind(total_amount)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(booking)
    }

    /// Buscar una reserva; `owner` limita el resultado a ese usuario
    /// (None = acceso de admin, sin scope)
    pub async fn find_by_id_scoped(
        &self,
        id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Booking>, i64), AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((bookings, total.0))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn list_all(
        &self,
        status: Option<&str>,
        user_id: Option<Uuid>,
        car_id: Option<Uuid>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Booking>, i64), AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::uuid IS NULL OR car_id = $3)
              AND ($4::date IS NULL OR start_date >= $4)
              AND ($5::date IS NULL OR end_date <= $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(status)
        .bind(user_id)
        .bind(car_id)
        .bind(start_date)
        .bind(end_date)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::uuid IS NULL OR car_id = $3)
              AND ($4::date IS NULL OR start_date >= $4)
              AND ($5::date IS NULL OR end_date <= $5)
            "#,
        )
        .bind(status)
        .bind(user_id)
        .bind(car_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok((bookings, total.0))
    }

    /// Conflicto para un reschedule: mismo chequeo semiabierto pero
    /// excluyendo la propia reserva
    pub async fn has_conflict_excluding(
        &self,
        car_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_booking: Uuid,
    ) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE car_id = $1
                  AND id <> $4
                  AND status IN ('confirmed', 'active')
                  AND start_date < $3 AND end_date > $2
            )
            "#,
        )
        .bind(car_id)
        .bind(start_date)
        .bind(end_date)
        .bind(exclude_booking)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn update_fields(
        &self,
        id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        pickup_location: String,
        dropoff_location: String,
    ) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET start_date = $2, end_date = $3, pickup_location = $4, dropoff_location = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(start_date)
        .bind(end_date)
        .bind(pickup_location)
        .bind(dropoff_location)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(booking)
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        status: &str,
        cancelled_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $2,
                cancelled_at = COALESCE($3, cancelled_at),
                completed_at = COALESCE($4, completed_at),
                updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(cancelled_at)
        .bind(completed_at)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'cancelled', cancelled_at = $2, updated_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(booking)
    }

    /// ¿Tiene el coche alguna reserva viva? (bloquea el borrado del coche)
    pub async fn has_blocking_for_car(&self, car_id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE car_id = $1 AND status IN ('pending', 'confirmed', 'active')
            )
            "#,
        )
        .bind(car_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}
