//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Las integraciones externas (gateway de
//! pago, email) van como capabilities inyectadas para poder sustituirlas
//! en tests.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::services::email_service::EmailSender;
use crate::services::notification_dispatcher::NotificationDispatcher;
use crate::services::payment_gateway::PaymentGateway;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub email: Arc<dyn EmailSender>,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: EnvironmentConfig,
        email: Arc<dyn EmailSender>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            pool,
            config,
            email,
            gateway,
        }
    }

    /// Dispatcher de notificaciones ligado al pool y al sender actuales
    pub fn dispatcher(&self) -> NotificationDispatcher {
        NotificationDispatcher::new(self.pool.clone(), Arc::clone(&self.email))
    }
}
