//! Servicio de email
//!
//! Capability inyectada: el dispatcher de notificaciones no conoce el
//! transporte. En desarrollo se usa el mock, que solo loguea.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email send failed: {0}")]
    SendFailed(String),
}

/// Transporte de email intercambiable
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

/// Mock de email para desarrollo: registra el envío en el log
pub struct MockEmailSender {
    pub from: String,
}

impl MockEmailSender {
    pub fn new(from: String) -> Self {
        Self { from }
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        tracing::info!(
            "📧 Mock email enviado: from='{}' to='{}' subject='{}' ({} bytes)",
            self.from,
            to,
            subject,
            body.len()
        );
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sender de test que falla siempre, para verificar que los fallos de
    /// email nunca se propagan
    pub struct FailingEmailSender {
        pub attempts: AtomicUsize,
    }

    impl FailingEmailSender {
        pub fn new() -> Self {
            Self {
                attempts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmailSender for FailingEmailSender {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), EmailError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(EmailError::SendFailed("smtp unreachable".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FailingEmailSender;
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_mock_sender_always_succeeds() {
        let sender = MockEmailSender::new("Car Rental <noreply@test.local>".to_string());
        let result = sender.send("user@example.com", "Hello", "body").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_failing_sender_counts_attempts() {
        let sender = FailingEmailSender::new();
        assert!(sender.send("user@example.com", "Hello", "body").await.is_err());
        assert!(sender.send("user@example.com", "Hello", "body").await.is_err());
        assert_eq!(sender.attempts.load(Ordering::SeqCst), 2);
    }
}
