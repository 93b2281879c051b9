//! Dispatcher de notificaciones
//!
//! Fire-and-forget: crea la fila de notificación y, si procede, intenta
//! un email. Los fallos de email se loguean y jamás se propagan ni se
//! reintentan; un evento del ciclo de vida nunca falla por culpa de una
//! notificación.

use futures::future::join_all;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::payment::Payment;
use crate::repositories::notification_repository::NotificationRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::email_service::EmailSender;
use crate::utils::errors::AppError;

pub struct NotificationDispatcher {
    notifications: NotificationRepository,
    users: UserRepository,
    email: Arc<dyn EmailSender>,
}

impl NotificationDispatcher {
    pub fn new(pool: PgPool, email: Arc<dyn EmailSender>) -> Self {
        Self {
            notifications: NotificationRepository::new(pool.clone()),
            users: UserRepository::new(pool),
            email,
        }
    }

    /// Crear la notificación y (opcionalmente) intentar el email.
    /// Best-effort: cualquier fallo se queda en el log.
    pub async fn dispatch(
        &self,
        user_id: Uuid,
        r#type: &str,
        title: &str,
        message: &str,
        metadata: Option<serde_json::Value>,
        send_email: bool,
    ) {
        if let Err(e) = self
            .notifications
            .create(user_id, r#type, title, message, metadata)
            .await
        {
            tracing::warn!("⚠️ No se pudo crear la notificación '{}' para {}: {}", r#type, user_id, e);
            return;
        }

        if send_email {
            self.email_user(user_id, title, message).await;
        }
    }

    /// Enviar un email best-effort a un usuario (fallos solo al log)
    pub async fn email_user(&self, user_id: Uuid, subject: &str, body: &str) {
        let user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!("⚠️ Email omitido: usuario {} no existe", user_id);
                return;
            }
            Err(e) => {
                tracing::warn!("⚠️ Email omitido: error buscando usuario {}: {}", user_id, e);
                return;
            }
        };

        let greeting = format!("Dear {},\n\n{}\n\nBest regards,\nCar Rental Team", user.full_name(), body);
        if let Err(e) = self.email.send(&user.email, subject, &greeting).await {
            tracing::warn!("⚠️ Fallo enviando email a {}: {}", user.email, e);
        }
    }

    pub async fn booking_created(&self, booking: &Booking) {
        let message = format!(
            "Your booking from {} to {} has been created and is pending payment.",
            booking.start_date, booking.end_date
        );
        self.dispatch(
            booking.user_id,
            "booking_created",
            "Booking Created",
            &message,
            Some(json!({ "booking_id": booking.id })),
            true,
        )
        .await;
    }

    pub async fn booking_confirmed(&self, booking: &Booking) {
        let message = format!(
            "Your booking from {} to {} has been confirmed.",
            booking.start_date, booking.end_date
        );
        self.dispatch(
            booking.user_id,
            "booking_confirmed",
            "Booking Confirmed",
            &message,
            Some(json!({ "booking_id": booking.id })),
            true,
        )
        .await;
    }

    pub async fn booking_cancelled(&self, booking: &Booking) {
        let message = format!(
            "Your booking from {} to {} has been cancelled.",
            booking.start_date, booking.end_date
        );
        self.dispatch(
            booking.user_id,
            "booking_cancelled",
            "Booking Cancelled",
            &message,
            Some(json!({ "booking_id": booking.id })),
            true,
        )
        .await;
    }

    pub async fn refund_processed(&self, payment: &Payment) {
        let message = format!(
            "Your payment of {} has been refunded and the associated booking cancelled.",
            payment.amount
        );
        self.dispatch(
            payment.user_id,
            "refund_processed",
            "Refund Processed",
            &message,
            Some(json!({ "payment_id": payment.id, "booking_id": payment.booking_id })),
            true,
        )
        .await;
    }

    /// Broadcast a todos los usuarios activos, con filtro opcional de rol.
    /// Las filas se insertan en bloque; los emails salen en paralelo y los
    /// fallos individuales no abortan el batch.
    pub async fn broadcast(
        &self,
        r#type: &str,
        title: &str,
        message: &str,
        user_role: Option<&str>,
        send_email: bool,
    ) -> Result<usize, AppError> {
        let users = self.users.find_active(user_role).await?;
        let user_ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();

        let count = self
            .notifications
            .create_many(&user_ids, r#type, title, message, Some(json!({ "broadcast": true })))
            .await?;

        if send_email {
            let sends = users.iter().map(|user| {
                let body = format!(
                    "Dear {},\n\n{}\n\nBest regards,\nCar Rental Team",
                    user.full_name(),
                    message
                );
                let email = Arc::clone(&self.email);
                let to = user.email.clone();
                let subject = title.to_string();
                async move {
                    if let Err(e) = email.send(&to, &subject, &body).await {
                        tracing::warn!("⚠️ Fallo enviando email de broadcast a {}: {}", to, e);
                    }
                }
            });
            join_all(sends).await;
        }

        Ok(count)
    }
}
