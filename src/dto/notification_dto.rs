//! DTOs de notificaciones

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::notification::Notification;

/// Request para enviar una notificación a un usuario (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct SendNotificationRequest {
    pub user_id: Uuid,

    #[validate(length(min = 1, max = 50))]
    pub r#type: String,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1))]
    pub message: String,

    #[serde(default)]
    pub send_email: bool,
}

/// Request de broadcast a todos los usuarios activos (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct BroadcastNotificationRequest {
    #[validate(length(min = 1, max = 50))]
    pub r#type: String,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1))]
    pub message: String,

    /// Filtro opcional por rol ("user" | "admin")
    pub user_role: Option<String>,

    #[serde(default)]
    pub send_email: bool,
}

/// Filtros del listado de notificaciones del usuario
#[derive(Debug, Deserialize)]
pub struct MyNotificationsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub is_read: Option<bool>,
}

/// Filtros del listado global (admin)
#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub r#type: Option<String>,
    pub is_read: Option<bool>,
    pub user_id: Option<Uuid>,
}

/// Response de notificación para la API
#[derive(Debug, Clone, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub r#type: String,
    pub title: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            r#type: n.r#type,
            title: n.title,
            message: n.message,
            metadata: n.metadata,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

/// Resultado de un broadcast
#[derive(Debug, Serialize)]
pub struct BroadcastResult {
    pub recipients_count: usize,
    pub email_sent: bool,
}
