//! Controllers de la API

pub mod booking_controller;
pub mod car_controller;
pub mod notification_controller;
pub mod payment_controller;
pub mod user_controller;
