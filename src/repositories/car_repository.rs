//! Repositorio de coches
//!
//! Incluye las dos queries del motor de disponibilidad: el filtrado de
//! coches (paso a) y los ids con reserva conflictiva (paso b). La resta
//! de conjuntos (paso c) es pura y vive en `models::car`.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::car_dto::{CreateCarRequest, UpdateCarRequest};
use crate::models::car::Car;
use crate::utils::errors::AppError;

pub struct CarRepository {
    pool: PgPool,
}

impl CarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateCarRequest) -> Result<Car, AppError> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (id, make, model, year, license_plate, color, category, transmission, fuel_type, seats, daily_rate, features, image_url, is_available, location, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, TRUE, $14, $15, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.make)
        .bind(request.model)
        .bind(request.year)
        .bind(request.license_plate)
        .bind(request.color)
        .bind(request.category)
        .bind(request.transmission)
        .bind(request.fuel_type)
        .bind(request.seats)
        .bind(request.daily_rate)
        .bind(request.features)
        .bind(request.image_url)
        .bind(request.location)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(car)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Car>, AppError> {
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(car)
    }

    pub async fn license_plate_exists(&self, license_plate: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM cars WHERE license_plate = $1)")
                .bind(license_plate)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn list(
        &self,
        category: Option<&str>,
        transmission: Option<&str>,
        fuel_type: Option<&str>,
        min_price: Decimal,
        max_price: Decimal,
        available_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Car>, i64), AppError> {
        let cars = sqlx::query_as::<_, Car>(
            r#"
            SELECT * FROM cars
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR transmission = $2)
              AND ($3::text IS NULL OR fuel_type = $3)
              AND daily_rate >= $4 AND daily_rate <= $5
              AND (NOT $6 OR is_available = TRUE)
            ORDER BY created_at DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(category)
        .bind(transmission)
        .bind(fuel_type)
        .bind(min_price)
        .bind(max_price)
        .bind(available_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM cars
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR transmission = $2)
              AND ($3::text IS NULL OR fuel_type = $3)
              AND daily_rate >= $4 AND daily_rate <= $5
              AND (NOT $6 OR is_available = TRUE)
            "#,
        )
        .bind(category)
        .bind(transmission)
        .bind(fuel_type)
        .bind(min_price)
        .bind(max_price)
        .bind(available_only)
        .fetch_one(&self.pool)
        .await?;

        Ok((cars, total.0))
    }

    pub async fn update(&self, id: Uuid, request: UpdateCarRequest) -> Result<Car, AppError> {
        // Obtener coche actual para el merge parcial
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        let car = sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET make = $2, model = $3, year = $4, license_plate = $5, color = $6,
                category = $7, transmission = $8, fuel_type = $9, seats = $10,
                daily_rate = $11, features = $12, image_url = $13, is_available = $14,
                location = $15, updated_at = $16
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.make.unwrap_or(current.make))
        .bind(request.model.unwrap_or(current.model))
        .bind(request.year.unwrap_or(current.year))
        .bind(request.license_plate.unwrap_or(current.license_plate))
        .bind(request.color.unwrap_or(current.color))
        .bind(request.category.unwrap_or(current.category))
        .bind(request.transmission.unwrap_or(current.transmission))
        .bind(request.fuel_type.unwrap_or(current.fuel_type))
        .bind(request.seats.unwrap_or(current.seats))
        .bind(request.daily_rate.unwrap_or(current.daily_rate))
        .bind(request.features.unwrap_or(current.features))
        .bind(request.image_url.or(current.image_url))
        .bind(request.is_available.unwrap_or(current.is_available))
        .bind(request.location.unwrap_or(current.location))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(car)
    }

    pub async fn set_availability(&self, id: Uuid, is_available: bool) -> Result<Option<Car>, AppError> {
        let car = sqlx::query_as::<_, Car>(
            "UPDATE cars SET is_available = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_available)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(car)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Paso (a) del buscador: coches operativos que cumplen los filtros
    pub async fn find_filtered_available(
        &self,
        category: Option<&str>,
        location: Option<&str>,
        min_price: Decimal,
        max_price: Decimal,
    ) -> Result<Vec<Car>, AppError> {
        let cars = sqlx::query_as::<_, Car>(
            r#"
            SELECT * FROM cars
            WHERE is_available = TRUE
              AND ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR location ILIKE '%' || $2 || '%')
              AND daily_rate >= $3 AND daily_rate <= $4
            ORDER BY daily_rate ASC
            "#,
        )
        .bind(category)
        .bind(location)
        .bind(min_price)
        .bind(max_price)
        .fetch_all(&self.pool)
        .await?;

        Ok(cars)
    }

    /// Paso (b) del buscador: ids de coches con reserva confirmed/active
    /// que solapa el rango pedido (intervalos semiabiertos)
    pub async fn booked_car_ids(
        &self,
        car_ids: &[Uuid],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Uuid>, AppError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT car_id FROM bookings
            WHERE car_id = ANY($1)
              AND status IN ('confirmed', 'active')
              AND start_date < $3 AND end_date > $2
            "#,
        )
        .bind(car_ids)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
