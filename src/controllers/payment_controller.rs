//! Controller de pagos: cobro contra la pasarela mock y refunds de admin

use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::{PageParams, Pagination};
use crate::dto::payment_dto::{
    PaymentListQuery, PaymentResponse, ProcessPaymentRequest, RefundRequest,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::BookingStatus;
use crate::models::payment::PAYMENT_METHODS;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::payment_repository::PaymentRepository;
use crate::services::notification_dispatcher::NotificationDispatcher;
use crate::services::payment_gateway::{refund_transaction_id, ChargeRequest, PaymentGateway};
use crate::utils::errors::AppError;

pub struct PaymentController {
    repository: PaymentRepository,
    bookings: BookingRepository,
    gateway: Arc<dyn PaymentGateway>,
    dispatcher: NotificationDispatcher,
}

/// Resultado de un intento de cobro. El fallo de la pasarela no es un
/// error HTTP 5xx: la fila de pago fallido se devuelve junto al mensaje.
pub enum ChargeResult {
    Approved(PaymentResponse),
    Declined {
        payment: PaymentResponse,
        message: String,
    },
}

impl PaymentController {
    pub fn new(
        pool: PgPool,
        gateway: Arc<dyn PaymentGateway>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            repository: PaymentRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool),
            gateway,
            dispatcher,
        }
    }

    pub async fn process(
        &self,
        user_id: Uuid,
        request: ProcessPaymentRequest,
    ) -> Result<ChargeResult, AppError> {
        request.validate()?;

        if !PAYMENT_METHODS.contains(&request.payment_method.as_str()) {
            return Err(AppError::BadRequest("Invalid payment method".to_string()));
        }

        // La reserva debe ser del usuario y seguir en pending
        let booking = self
            .bookings
            .find_by_id_scoped(request.booking_id, Some(user_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.status() != Some(BookingStatus::Pending) {
            return Err(AppError::InvalidState(
                "Payment can only be processed for pending bookings".to_string(),
            ));
        }

        if self
            .repository
            .completed_exists_for_booking(booking.id)
            .await?
        {
            return Err(AppError::InvalidState(
                "Payment already processed for this booking".to_string(),
            ));
        }

        let outcome = self
            .gateway
            .charge(&ChargeRequest {
                amount: booking.total_amount,
                card_number: request.card_number,
            })
            .await;

        let payment = self
            .repository
            .record_outcome(
                booking.id,
                user_id,
                booking.total_amount,
                request.payment_method,
                &outcome,
            )
            .await?;

        if outcome.success {
            tracing::info!("💳 Pago aprobado para la reserva {}", booking.id);
            // La reserva ya quedó confirmada en la misma transacción
            if let Some(confirmed) = self.bookings.find_by_id_scoped(booking.id, None).await? {
                self.dispatcher.booking_confirmed(&confirmed).await;
            }
            Ok(ChargeResult::Approved(payment.into()))
        } else {
            tracing::info!(
                "💳 Pago rechazado para la reserva {}: {}",
                booking.id,
                outcome.message
            );
            Ok(ChargeResult::Declined {
                payment: payment.into(),
                message: outcome.message,
            })
        }
    }

    pub async fn get_by_id(
        &self,
        acting_user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<PaymentResponse, AppError> {
        let payment = self
            .repository
            .find_by_id_scoped(id, acting_user.owner_scope())
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;
        Ok(payment.into())
    }

    pub async fn get_by_booking(
        &self,
        acting_user: &AuthenticatedUser,
        booking_id: Uuid,
    ) -> Result<PaymentResponse, AppError> {
        let payment = self
            .repository
            .find_by_booking_scoped(booking_id, acting_user.owner_scope())
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;
        Ok(payment.into())
    }

    /// Refund de admin: marca el pago como refunded y cancela la reserva
    /// asociada en una sola transacción.
    pub async fn refund(
        &self,
        acting_user: &AuthenticatedUser,
        id: Uuid,
        request: RefundRequest,
    ) -> Result<PaymentResponse, AppError> {
        acting_user.require_admin()?;

        let payment = self
            .repository
            .find_by_id_scoped(id, None)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        if payment.refunded_at.is_some() {
            return Err(AppError::InvalidState(
                "Payment already refunded".to_string(),
            ));
        }
        if !payment.is_refundable() {
            return Err(AppError::InvalidState(
                "Only completed payments can be refunded".to_string(),
            ));
        }

        let reason = request.reason.unwrap_or_else(|| "Admin refund".to_string());
        let refunded = self
            .repository
            .mark_refunded(payment.id, payment.booking_id, reason, refund_transaction_id())
            .await?;

        tracing::info!("↩️ Refund procesado para el pago {}", refunded.id);
        self.dispatcher.refund_processed(&refunded).await;
        Ok(refunded.into())
    }

    pub async fn list(
        &self,
        acting_user: &AuthenticatedUser,
        query: PaymentListQuery,
    ) -> Result<(Vec<PaymentResponse>, Pagination), AppError> {
        acting_user.require_admin()?;

        let params = PageParams {
            page: query.page,
            limit: query.limit,
        };

        let (payments, total) = self
            .repository
            .list_all(
                query.status.as_deref(),
                query.user_id,
                query.start_date,
                query.end_date,
                params.limit(),
                params.offset(),
            )
            .await?;

        let pagination = Pagination::new(params.page(), params.limit(), total);
        Ok((payments.into_iter().map(Into::into).collect(), pagination))
    }
}
