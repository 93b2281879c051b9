//! Modelo de Payment
//!
//! Mapea exactamente a la tabla `payments`. Como máximo existe un pago
//! `completed` por reserva; un refund pasa el pago a `refunded` y la
//! reserva asociada a `cancelled`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estados de un pago
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// Métodos de pago aceptados
pub const PAYMENT_METHODS: &[&str] = &["credit_card", "debit_card", "paypal"];

/// Payment - mapea exactamente a la tabla payments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
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
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_refundable(&self) -> bool {
        self.status == PaymentStatus::Completed.as_str() && self.refunded_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payment(status: PaymentStatus, refunded_at: Option<DateTime<Utc>>) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: Decimal::from(150),
            payment_method: "credit_card".to_string(),
            status: status.as_str().to_string(),
            transaction_id: Some("txn_deadbeef".to_string()),
            gateway_response: None,
            failure_reason: None,
            refund_reason: None,
            refund_transaction_id: None,
            processed_at: Some(Utc::now()),
            refunded_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_refundable_only_when_completed_and_not_refunded() {
        assert!(sample_payment(PaymentStatus::Completed, None).is_refundable());
        assert!(!sample_payment(PaymentStatus::Failed, None).is_refundable());
        assert!(!sample_payment(PaymentStatus::Refunded, Some(Utc::now())).is_refundable());
        // pago completado pero ya marcado como devuelto
        assert!(!sample_payment(PaymentStatus::Completed, Some(Utc::now())).is_refundable());
    }
}
