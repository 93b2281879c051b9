//! Controller de vehículos: catálogo, búsqueda por disponibilidad y administración

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

use crate::dto::car_dto::{
    CarListQuery, CarResponse, CarSearchQuery, CreateCarRequest, SearchCriteria,
    UpdateAvailabilityRequest, UpdateCarRequest,
};
use crate::dto::common_dto::{PageParams, Pagination};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::car::{filter_out_booked, CAR_CATEGORIES, FUEL_TYPES, TRANSMISSIONS};
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::car_repository::CarRepository;
use crate::utils::errors::AppError;

pub struct CarController {
    repository: CarRepository,
    bookings: BookingRepository,
}

impl CarController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CarRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        acting_user: &AuthenticatedUser,
        request: CreateCarRequest,
    ) -> Result<CarResponse, AppError> {
        acting_user.require_admin()?;
        request.validate()?;
        validate_enums(
            Some(&request.category),
            Some(&request.transmission),
            Some(&request.fuel_type),
        )?;

        if self
            .repository
            .license_plate_exists(&request.license_plate)
            .await?
        {
            return Err(AppError::Conflict(
                "Car with this license plate already exists".to_string(),
            ));
        }

        let car = self.repository.create(request).await?;
        Ok(car.into())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<CarResponse, AppError> {
        let car = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;
        Ok(car.into())
    }

    pub async fn list(
        &self,
        query: CarListQuery,
    ) -> Result<(Vec<CarResponse>, Pagination), AppError> {
        validate_enums(
            query.category.as_deref(),
            query.transmission.as_deref(),
            query.fuel_type.as_deref(),
        )?;

        let params = PageParams {
            page: query.page,
            limit: query.limit,
        };

        let (cars, total) = self
            .repository
            .list(
                query.category.as_deref(),
                query.transmission.as_deref(),
                query.fuel_type.as_deref(),
                query.min_price.unwrap_or(Decimal::ZERO),
                query.max_price.unwrap_or_else(|| Decimal::from(100_000)),
                query.available_only.unwrap_or(false),
                params.limit(),
                params.offset(),
            )
            .await?;

        let pagination = Pagination::new(params.page(), params.limit(), total);
        Ok((cars.into_iter().map(Into::into).collect(), pagination))
    }

    /// Búsqueda de disponibilidad por rango de fechas.
    ///
    /// Tres pasos: filtrado por criterios, ids de coches con reservas
    /// solapadas y exclusión en memoria.
    pub async fn search(
        &self,
        query: CarSearchQuery,
    ) -> Result<(Vec<CarResponse>, SearchCriteria), AppError> {
        if query.start_date >= query.end_date {
            return Err(AppError::BadRequest(
                "End date must be after start date".to_string(),
            ));
        }

        let min_price = query.min_price.unwrap_or(Decimal::ZERO);
        let max_price = query.max_price.unwrap_or_else(|| Decimal::from(1000));

        let criteria = SearchCriteria {
            start_date: query.start_date,
            end_date: query.end_date,
            category: query.category.clone(),
            location: query.location.clone(),
            min_price,
            max_price,
        };

        let candidates = self
            .repository
            .find_filtered_available(
                query.category.as_deref(),
                query.location.as_deref(),
                min_price,
                max_price,
            )
            .await?;

        if candidates.is_empty() {
            return Ok((Vec::new(), criteria));
        }

        let ids: Vec<Uuid> = candidates.iter().map(|c| c.id).collect();
        let booked: HashSet<Uuid> = self
            .repository
            .booked_car_ids(&ids, query.start_date, query.end_date)
            .await?
            .into_iter()
            .collect();

        let available = filter_out_booked(candidates, &booked);
        Ok((available.into_iter().map(Into::into).collect(), criteria))
    }

    pub async fn update(
        &self,
        acting_user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateCarRequest,
    ) -> Result<CarResponse, AppError> {
        acting_user.require_admin()?;
        request.validate()?;
        validate_enums(
            request.category.as_deref(),
            request.transmission.as_deref(),
            request.fuel_type.as_deref(),
        )?;

        let current = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        if let Some(ref plate) = request.license_plate {
            if plate != &current.license_plate
                && self.repository.license_plate_exists(plate).await?
            {
                return Err(AppError::Conflict(
                    "Car with this license plate already exists".to_string(),
                ));
            }
        }

        let car = self.repository.update(id, request).await?;
        Ok(car.into())
    }

    pub async fn set_availability(
        &self,
        acting_user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateAvailabilityRequest,
    ) -> Result<CarResponse, AppError> {
        acting_user.require_admin()?;

        let car = self
            .repository
            .set_availability(id, request.is_available)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;
        Ok(car.into())
    }

    pub async fn delete(&self, acting_user: &AuthenticatedUser, id: Uuid) -> Result<(), AppError> {
        acting_user.require_admin()?;

        if self.bookings.has_blocking_for_car(id).await? {
            return Err(AppError::Conflict(
                "Cannot delete car with active bookings".to_string(),
            ));
        }

        let deleted = self.repository.delete(id).await?;
        if !deleted {
            return Err(AppError::NotFound("Car not found".to_string()));
        }
        Ok(())
    }
}

fn validate_enums(
    category: Option<&str>,
    transmission: Option<&str>,
    fuel_type: Option<&str>,
) -> Result<(), AppError> {
    if let Some(c) = category {
        if !CAR_CATEGORIES.contains(&c) {
            return Err(AppError::BadRequest(format!("Invalid category: {}", c)));
        }
    }
    if let Some(t) = transmission {
        if !TRANSMISSIONS.contains(&t) {
            return Err(AppError::BadRequest(format!("Invalid transmission: {}", t)));
        }
    }
    if let Some(f) = fuel_type {
        if !FUEL_TYPES.contains(&f) {
            return Err(AppError::BadRequest(format!("Invalid fuel type: {}", f)));
        }
    }
    Ok(())
}
