//! Servicios e integraciones inyectables

pub mod email_service;
pub mod notification_dispatcher;
pub mod payment_gateway;
