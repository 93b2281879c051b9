//! Modelo de Car
//!
//! Mapea exactamente a la tabla `cars`. La disponibilidad real para un
//! rango de fechas se deriva de las reservas (ver repositorio), el flag
//! `is_available` solo indica si el coche está operativo.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;
use uuid::Uuid;

/// Categorías de coche soportadas
pub const CAR_CATEGORIES: &[&str] = &[
    "economy",
    "compact",
    "midsize",
    "fullsize",
    "luxury",
    "suv",
    "convertible",
];

/// Tipos de transmisión soportados
pub const TRANSMISSIONS: &[&str] = &["manual", "automatic"];

/// Tipos de combustible soportados
pub const FUEL_TYPES: &[&str] = &["gasoline", "diesel", "hybrid", "electric"];

/// Car - mapea exactamente a la tabla cars
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Car {
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
    pub updated_at: DateTime<Utc>,
}

/// Quitar de la lista los coches con reserva conflictiva (paso (c) del
/// motor de disponibilidad: resta de conjuntos sobre los ids reservados)
pub fn filter_out_booked(cars: Vec<Car>, booked_car_ids: &HashSet<Uuid>) -> Vec<Car> {
    cars.into_iter()
        .filter(|car| !booked_car_ids.contains(&car.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_car(id: Uuid) -> Car {
        Car {
            id,
            make: "Toyota".to_string(),
            model: "RAV4".to_string(),
            year: 2023,
            license_plate: format!("PLATE-{}", id.simple()),
            color: "blue".to_string(),
            category: "suv".to_string(),
            transmission: "automatic".to_string(),
            fuel_type: "hybrid".to_string(),
            seats: 5,
            daily_rate: Decimal::new(5000, 2),
            features: vec!["gps".to_string()],
            image_url: None,
            is_available: true,
            location: "Madrid".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_out_booked() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let cars = vec![sample_car(a), sample_car(b), sample_car(c)];

        let booked: HashSet<Uuid> = [b].into_iter().collect();
        let available = filter_out_booked(cars, &booked);

        let ids: Vec<Uuid> = available.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_filter_out_booked_empty_set_keeps_all() {
        let cars = vec![sample_car(Uuid::new_v4()), sample_car(Uuid::new_v4())];
        let available = filter_out_booked(cars.clone(), &HashSet::new());
        assert_eq!(available.len(), cars.len());
    }
}
