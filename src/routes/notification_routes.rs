use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::controllers::notification_controller::NotificationController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::notification_dto::{
    BroadcastNotificationRequest, BroadcastResult, MyNotificationsQuery, NotificationListQuery,
    NotificationResponse, SendNotificationRequest,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Todas las rutas de notificaciones requieren autenticación
pub fn create_notification_router() -> Router<AppState> {
    Router::new()
        .route("/my-notifications", get(my_notifications))
        .route("/", get(list_notifications))
        .route("/send", post(send_notification))
        .route("/broadcast", post(broadcast_notification))
        .route("/:id/read", put(mark_read))
        .route("/:id", delete(delete_notification))
}

fn controller(state: &AppState) -> NotificationController {
    NotificationController::new(state.pool.clone(), state.dispatcher())
}

async fn my_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<MyNotificationsQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let (notifications, pagination) = controller(&state)
        .my_notifications(user.user_id, query)
        .await?;
    Ok(Json(ApiResponse::success(json!({
        "notifications": notifications,
        "pagination": pagination,
    }))))
}

async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let (notifications, pagination) = controller(&state).list(&user, query).await?;
    Ok(Json(ApiResponse::success(json!({
        "notifications": notifications,
        "pagination": pagination,
    }))))
}

async fn send_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<SendNotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NotificationResponse>>), AppError> {
    let response = controller(&state).send(&user, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

async fn broadcast_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<BroadcastNotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BroadcastResult>>), AppError> {
    let response = controller(&state).broadcast(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            response,
            "Broadcast sent successfully".to_string(),
        )),
    ))
}

async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationResponse>>, AppError> {
    let response = controller(&state).mark_read(user.user_id, id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn delete_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    controller(&state).delete(user.user_id, id).await?;
    Ok(Json(ApiResponse::message_only(
        "Notification deleted successfully".to_string(),
    )))
}
