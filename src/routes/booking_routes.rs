use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    BookingListQuery, BookingResponse, CreateBookingRequest, MyBookingsQuery,
    UpdateBookingRequest, UpdateBookingStatusRequest,
};
use crate::dto::common_dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Todas las rutas de reservas requieren autenticación
pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/", get(list_bookings))
        .route("/my-bookings", get(my_bookings))
        .route("/:id", get(get_booking))
        .route("/:id", put(update_booking))
        .route("/:id/cancel", post(cancel_booking))
        .route("/:id/status", put(update_booking_status))
}

fn controller(state: &AppState) -> BookingController {
    BookingController::new(state.pool.clone(), &state.config, state.dispatcher())
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingResponse>>), AppError> {
    let response = controller(&state).create(user.user_id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            response,
            "Booking created successfully".to_string(),
        )),
    ))
}

async fn my_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<MyBookingsQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let (bookings, pagination) = controller(&state).my_bookings(user.user_id, query).await?;
    Ok(Json(ApiResponse::success(json!({
        "bookings": bookings,
        "pagination": pagination,
    }))))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let (bookings, pagination) = controller(&state).list_all(&user, query).await?;
    Ok(Json(ApiResponse::success(json!({
        "bookings": bookings,
        "pagination": pagination,
    }))))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state).get_by_id(&user, id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn update_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state).update(&user, id, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state).cancel(&user, id).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Booking cancelled successfully".to_string(),
    )))
}

async fn update_booking_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state).update_status(&user, id, request).await?;
    Ok(Json(ApiResponse::success(response)))
}
