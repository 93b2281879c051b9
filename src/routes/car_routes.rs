use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::controllers::car_controller::CarController;
use crate::dto::car_dto::{
    CarListQuery, CarResponse, CarSearchQuery, CreateCarRequest, UpdateAvailabilityRequest,
    UpdateCarRequest,
};
use crate::dto::common_dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas públicas: catálogo y buscador de disponibilidad
pub fn create_public_car_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars))
        .route("/search", get(search_cars))
        .route("/:id", get(get_car))
}

/// Rutas protegidas (admin): gestión de la flota
pub fn create_car_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_car))
        .route("/:id", put(update_car))
        .route("/:id", delete(delete_car))
        .route("/:id/availability", put(set_availability))
}

async fn list_cars(
    State(state): State<AppState>,
    Query(query): Query<CarListQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let (cars, pagination) = controller.list(query).await?;
    Ok(Json(ApiResponse::success(json!({
        "cars": cars,
        "pagination": pagination,
    }))))
}

async fn search_cars(
    State(state): State<AppState>,
    Query(query): Query<CarSearchQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let (cars, criteria) = controller.search(query).await?;
    let count = cars.len();
    Ok(Json(ApiResponse::success(json!({
        "cars": cars,
        "count": count,
        "search_criteria": criteria,
    }))))
}

async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn create_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateCarRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CarResponse>>), AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

async fn update_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.update(&user, id, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn set_availability(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.set_availability(&user, id, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn delete_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    controller.delete(&user, id).await?;
    Ok(Json(ApiResponse::message_only(
        "Car deleted successfully".to_string(),
    )))
}
