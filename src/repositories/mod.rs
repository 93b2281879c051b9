//! Repositorios: todo el SQL vive aquí

pub mod booking_repository;
pub mod car_repository;
pub mod notification_repository;
pub mod payment_repository;
pub mod user_repository;
