//! DTOs de la API

pub mod booking_dto;
pub mod car_dto;
pub mod common_dto;
pub mod notification_dto;
pub mod payment_dto;
pub mod user_dto;
