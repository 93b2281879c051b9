//! Gateway de pagos
//!
//! El core del ciclo de vida nunca habla con una pasarela real: recibe un
//! `PaymentGateway` inyectado. El mock es determinista para dos tarjetas
//! de test y acepta cualquier otro número de 16 dígitos.

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

/// Tarjeta de test que siempre devuelve rechazo
pub const CARD_ALWAYS_DECLINED: &str = "4000000000000002";
/// Tarjeta de test que siempre devuelve error de procesamiento
pub const CARD_PROCESSING_ERROR: &str = "4000000000000119";

/// Datos enviados al gateway
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: Decimal,
    pub card_number: Option<String>,
}

/// Resultado de un intento de cobro
#[derive(Debug, Clone)]
pub struct GatewayOutcome {
    pub success: bool,
    pub message: String,
    pub transaction_id: Option<String>,
    pub gateway_response: Option<serde_json::Value>,
}

impl GatewayOutcome {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            transaction_id: None,
            gateway_response: None,
        }
    }
}

/// Pasarela de pago intercambiable (mock en desarrollo y tests)
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> GatewayOutcome;
}

/// Mock determinista de la pasarela
pub struct MockPaymentGateway;

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn charge(&self, request: &ChargeRequest) -> GatewayOutcome {
        let card_number = match &request.card_number {
            Some(n) => n.as_str(),
            None => return GatewayOutcome::failure("Invalid card number"),
        };

        match card_number {
            CARD_ALWAYS_DECLINED => GatewayOutcome::failure("Card declined"),
            CARD_PROCESSING_ERROR => GatewayOutcome::failure("Processing error"),
            n if n.len() == 16 && n.chars().all(|c| c.is_ascii_digit()) => {
                let txn = Uuid::new_v4().simple().to_string();
                let authorization_code: String = rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(6)
                    .map(char::from)
                    .collect::<String>()
                    .to_uppercase();

                GatewayOutcome {
                    success: true,
                    message: "Payment successful".to_string(),
                    transaction_id: Some(format!("txn_{}", &txn[..8])),
                    gateway_response: Some(json!({
                        "status": "approved",
                        "authorization_code": authorization_code,
                    })),
                }
            }
            _ => GatewayOutcome::failure("Invalid card number"),
        }
    }
}

/// Id de transacción para refunds
pub fn refund_transaction_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("rfnd_{}", &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(card: Option<&str>) -> ChargeRequest {
        ChargeRequest {
            amount: Decimal::from(150),
            card_number: card.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_declined_card_is_deterministic() {
        let gateway = MockPaymentGateway;
        for _ in 0..3 {
            let outcome = gateway.charge(&request(Some(CARD_ALWAYS_DECLINED))).await;
            assert!(!outcome.success);
            assert_eq!(outcome.message, "Card declined");
            assert!(outcome.transaction_id.is_none());
        }
    }

    #[tokio::test]
    async fn test_processing_error_card() {
        let gateway = MockPaymentGateway;
        let outcome = gateway.charge(&request(Some(CARD_PROCESSING_ERROR))).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Processing error");
    }

    #[tokio::test]
    async fn test_valid_card_succeeds() {
        let gateway = MockPaymentGateway;
        let outcome = gateway.charge(&request(Some("4111111111111111"))).await;
        assert!(outcome.success);
        let txn = outcome.transaction_id.unwrap();
        assert!(txn.starts_with("txn_"));
        assert_eq!(txn.len(), 12);
        let response = outcome.gateway_response.unwrap();
        assert_eq!(response["status"], "approved");
    }

    #[tokio::test]
    async fn test_malformed_card_rejected() {
        let gateway = MockPaymentGateway;
        for card in [Some("1234"), Some("abcdabcdabcdabcd"), None] {
            let outcome = gateway.charge(&request(card)).await;
            assert!(!outcome.success);
            assert_eq!(outcome.message, "Invalid card number");
        }
    }

    #[test]
    fn test_refund_transaction_id_format() {
        let id = refund_transaction_id();
        assert!(id.starts_with("rfnd_"));
        assert_eq!(id.len(), 13);
    }
}
