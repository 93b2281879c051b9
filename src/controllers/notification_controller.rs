//! Controller de notificaciones: bandeja del usuario y envíos de admin

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::{PageParams, Pagination};
use crate::dto::notification_dto::{
    BroadcastNotificationRequest, BroadcastResult, MyNotificationsQuery, NotificationListQuery,
    NotificationResponse, SendNotificationRequest,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::UserRole;
use crate::repositories::notification_repository::NotificationRepository;
use crate::services::notification_dispatcher::NotificationDispatcher;
use crate::utils::errors::AppError;

pub struct NotificationController {
    repository: NotificationRepository,
    dispatcher: NotificationDispatcher,
}

impl NotificationController {
    pub fn new(pool: PgPool, dispatcher: NotificationDispatcher) -> Self {
        Self {
            repository: NotificationRepository::new(pool),
            dispatcher,
        }
    }

    /// Envío directo a un usuario (admin). A diferencia de los eventos del
    /// ciclo de vida, aquí el fallo al crear la fila sí se propaga.
    pub async fn send(
        &self,
        acting_user: &AuthenticatedUser,
        request: SendNotificationRequest,
    ) -> Result<NotificationResponse, AppError> {
        acting_user.require_admin()?;
        request.validate()?;

        let notification = self
            .repository
            .create(
                request.user_id,
                &request.r#type,
                &request.title,
                &request.message,
                None,
            )
            .await?;

        if request.send_email {
            self.dispatcher
                .email_user(request.user_id, &request.title, &request.message)
                .await;
        }

        Ok(notification.into())
    }

    pub async fn broadcast(
        &self,
        acting_user: &AuthenticatedUser,
        request: BroadcastNotificationRequest,
    ) -> Result<BroadcastResult, AppError> {
        acting_user.require_admin()?;
        request.validate()?;

        if let Some(ref role) = request.user_role {
            if UserRole::from_str(role).is_none() {
                return Err(AppError::BadRequest("Invalid role".to_string()));
            }
        }

        let count = self
            .dispatcher
            .broadcast(
                &request.r#type,
                &request.title,
                &request.message,
                request.user_role.as_deref(),
                request.send_email,
            )
            .await?;

        tracing::info!("📣 Broadcast '{}' enviado a {} usuarios", request.r#type, count);
        Ok(BroadcastResult {
            recipients_count: count,
            email_sent: request.send_email,
        })
    }

    pub async fn my_notifications(
        &self,
        user_id: Uuid,
        query: MyNotificationsQuery,
    ) -> Result<(Vec<NotificationResponse>, Pagination), AppError> {
        let params = PageParams {
            page: query.page,
            limit: query.limit,
        };

        let (notifications, total) = self
            .repository
            .list_by_user(user_id, query.is_read, params.limit(), params.offset())
            .await?;

        let pagination = Pagination::new(params.page(), params.limit(), total);
        Ok((
            notifications.into_iter().map(Into::into).collect(),
            pagination,
        ))
    }

    pub async fn mark_read(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<NotificationResponse, AppError> {
        let notification = self
            .repository
            .mark_read(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;
        Ok(notification.into())
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let deleted = self.repository.delete(id, user_id).await?;
        if !deleted {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        acting_user: &AuthenticatedUser,
        query: NotificationListQuery,
    ) -> Result<(Vec<NotificationResponse>, Pagination), AppError> {
        acting_user.require_admin()?;

        let params = PageParams {
            page: query.page,
            limit: query.limit,
        };

        let (notifications, total) = self
            .repository
            .list_all(
                query.r#type.as_deref(),
                query.is_read,
                query.user_id,
                params.limit(),
                params.offset(),
            )
            .await?;

        let pagination = Pagination::new(params.page(), params.limit(), total);
        Ok((
            notifications.into_iter().map(Into::into).collect(),
            pagination,
        ))
    }
}
