//! DTOs de reservas

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::booking::Booking;

/// Request para crear una reserva
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(length(min = 5, max = 200))]
    pub pickup_location: String,

    #[validate(length(min = 5, max = 200))]
    pub dropoff_location: String,
}

/// Request para actualizar una reserva (parcial)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookingRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    #[validate(length(min = 5, max = 200))]
    pub pickup_location: Option<String>,

    #[validate(length(min = 5, max = 200))]
    pub dropoff_location: Option<String>,
}

/// Request del cambio directo de estado (admin)
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

/// Filtros del listado de reservas del usuario
#[derive(Debug, Deserialize)]
pub struct MyBookingsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

/// Filtros del listado global de reservas (admin)
#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Response de reserva para la API
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub total_amount: Decimal,
    pub status: String,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            car_id: booking.car_id,
            user_id: booking.user_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            pickup_location: booking.pickup_location,
            dropoff_location: booking.dropoff_location,
            total_amount: booking.total_amount,
            status: booking.status,
            cancelled_at: booking.cancelled_at,
            completed_at: booking.completed_at,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}
