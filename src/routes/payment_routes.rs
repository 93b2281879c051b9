use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::controllers::payment_controller::{ChargeResult, PaymentController};
use crate::dto::common_dto::ApiResponse;
use crate::dto::payment_dto::{PaymentListQuery, PaymentResponse, ProcessPaymentRequest, RefundRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Todas las rutas de pagos requieren autenticación
pub fn create_payment_router() -> Router<AppState> {
    Router::new()
        .route("/process", post(process_payment))
        .route("/", get(list_payments))
        .route("/booking/:booking_id", get(get_payment_by_booking))
        .route("/:id", get(get_payment))
        .route("/:id/refund", post(refund_payment))
}

fn controller(state: &AppState) -> PaymentController {
    PaymentController::new(
        state.pool.clone(),
        Arc::clone(&state.gateway),
        state.dispatcher(),
    )
}

async fn process_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<ProcessPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentResponse>>), AppError> {
    match controller(&state).process(user.user_id, request).await? {
        ChargeResult::Approved(payment) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success_with_message(
                payment,
                "Payment processed successfully".to_string(),
            )),
        )),
        // El rechazo de la pasarela no es un 5xx: se devuelve la fila fallida
        ChargeResult::Declined { payment, message } => Ok((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error_with_data(payment, message)),
        )),
    }
}

async fn get_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PaymentResponse>>, AppError> {
    let response = controller(&state).get_by_id(&user, id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn get_payment_by_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<PaymentResponse>>, AppError> {
    let response = controller(&state).get_by_booking(&user, booking_id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn refund_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<RefundRequest>,
) -> Result<Json<ApiResponse<PaymentResponse>>, AppError> {
    let response = controller(&state).refund(&user, id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Refund processed successfully".to_string(),
    )))
}

async fn list_payments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let (payments, pagination) = controller(&state).list(&user, query).await?;
    Ok(Json(ApiResponse::success(json!({
        "payments": payments,
        "pagination": pagination,
    }))))
}
