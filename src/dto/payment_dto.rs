//! DTOs de pagos

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::payment::Payment;

/// Request para procesar un pago
#[derive(Debug, Deserialize, Validate)]
pub struct ProcessPaymentRequest {
    pub booking_id: Uuid,

    /// credit_card | debit_card | paypal
    pub payment_method: String,

    pub card_number: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub card_holder_name: Option<String>,

    #[validate(range(min = 1, max = 12))]
    pub expiry_month: Option<u8>,

    pub expiry_year: Option<u16>,

    #[validate(length(min = 3, max = 4))]
    pub cvv: Option<String>,
}

/// Request de refund (admin)
#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub reason: Option<String>,
}

/// Filtros del listado de pagos (admin)
#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Response de pago para la API
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub gateway_response: Option<serde_json::Value>,
    pub failure_reason: Option<String>,
    pub refund_reason: Option<String>,
    pub refund_transaction_id: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            booking_id: payment.booking_id,
            user_id: payment.user_id,
            amount: payment.amount,
            payment_method: payment.payment_method,
            status: payment.status,
            transaction_id: payment.transaction_id,
            gateway_response: payment.gateway_response,
            failure_reason: payment.failure_reason,
            refund_reason: payment.refund_reason,
            refund_transaction_id: payment.refund_transaction_id,
            processed_at: payment.processed_at,
            refunded_at: payment.refunded_at,
            created_at: payment.created_at,
        }
    }
}
