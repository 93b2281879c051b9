//! DTOs de coches y del buscador de disponibilidad

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::car::Car;

/// La tarifa diaria tiene que ser estrictamente positiva; se corta aquí
/// para que el cliente reciba 400 y no el CHECK de la base de datos
fn validate_daily_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if *rate <= Decimal::ZERO {
        return Err(ValidationError::new("daily_rate_must_be_positive"));
    }
    Ok(())
}

/// Request para crear un coche (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCarRequest {
    #[validate(length(min = 2, max = 50))]
    pub make: String,

    #[validate(length(min = 1, max = 50))]
    pub model: String,

    #[validate(range(min = 1990, max = 2100))]
    pub year: i32,

    #[validate(length(min = 3, max = 15))]
    pub license_plate: String,

    #[validate(length(min = 3, max = 30))]
    pub color: String,

    pub category: String,
    pub transmission: String,
    pub fuel_type: String,

    #[validate(range(min = 2, max = 9))]
    pub seats: i32,

    #[validate(custom = "validate_daily_rate")]
    pub daily_rate: Decimal,

    #[serde(default)]
    pub features: Vec<String>,

    pub image_url: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub location: String,
}

/// Request para actualizar un coche (admin, parcial)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCarRequest {
    #[validate(length(min = 2, max = 50))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub model: Option<String>,

    #[validate(range(min = 1990, max = 2100))]
    pub year: Option<i32>,

    #[validate(length(min = 3, max = 15))]
    pub license_plate: Option<String>,

    #[validate(length(min = 3, max = 30))]
    pub color: Option<String>,

    pub category: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,

    #[validate(range(min = 2, max = 9))]
    pub seats: Option<i32>,

    #[validate(custom = "validate_daily_rate")]
    pub daily_rate: Option<Decimal>,
    pub features: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,

    #[validate(length(min = 2, max = 100))]
    pub location: Option<String>,
}

/// Request para cambiar el flag de disponibilidad (admin)
#[derive(Debug, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub is_available: bool,
}

/// Filtros del listado de coches
#[derive(Debug, Deserialize)]
pub struct CarListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub available_only: Option<bool>,
}

/// Query del buscador de disponibilidad por rango de fechas
#[derive(Debug, Deserialize)]
pub struct CarSearchQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: Option<String>,
    pub location: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// Response de coche para la API
#[derive(Debug, Clone, Serialize)]
pub struct CarResponse {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub color: String,
    pub category: String,
    pub transmission: String,
    pub fuel_type: String,
    pub seats: i32,
    pub daily_rate: Decimal,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            id: car.id,
            make: car.make,
            model: car.model,
            year: car.year,
            license_plate: car.license_plate,
            color: car.color,
            category: car.category,
            transmission: car.transmission,
            fuel_type: car.fuel_type,
            seats: car.seats,
            daily_rate: car.daily_rate,
            features: car.features,
            image_url: car.image_url,
            is_available: car.is_available,
            location: car.location,
            created_at: car.created_at,
        }
    }
}

/// Criterios de búsqueda devueltos junto al resultado del buscador
#[derive(Debug, Serialize)]
pub struct SearchCriteria {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub category: Option<String>,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request(daily_rate: Decimal) -> CreateCarRequest {
        CreateCarRequest {
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2023,
            license_plate: "ABC-1234".to_string(),
            color: "white".to_string(),
            category: "compact".to_string(),
            transmission: "automatic".to_string(),
            fuel_type: "hybrid".to_string(),
            seats: 5,
            daily_rate,
            features: vec![],
            image_url: None,
            location: "Madrid".to_string(),
        }
    }

    #[test]
    fn test_daily_rate_must_be_positive() {
        assert!(sample_request(Decimal::from(50)).validate().is_ok());
        assert!(sample_request(Decimal::ZERO).validate().is_err());
        assert!(sample_request(Decimal::from(-10)).validate().is_err());
    }

    #[test]
    fn test_update_daily_rate_validated_when_present() {
        let mut request = UpdateCarRequest {
            make: None,
            model: None,
            year: None,
            license_plate: None,
            color: None,
            category: None,
            transmission: None,
            fuel_type: None,
            seats: None,
            daily_rate: None,
            features: None,
            image_url: None,
            is_available: None,
            location: None,
        };
        assert!(request.validate().is_ok());

        request.daily_rate = Some(Decimal::ZERO);
        assert!(request.validate().is_err());

        request.daily_rate = Some(Decimal::from(75));
        assert!(request.validate().is_ok());
    }
}
