use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::controllers::user_controller::UserController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::user_dto::{
    AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest, UpdateUserStatusRequest,
    UserListQuery, UserResponse,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas públicas: registro y login
pub fn create_public_user_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Rutas protegidas: perfil, logout y gestión de usuarios de admin
pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile", put(update_profile))
        .route("/logout", post(logout))
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route("/:id", delete(delete_user))
        .route("/:id/profile", put(update_user_profile))
        .route("/:id/status", put(update_user_status))
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    let controller = UserController::new(state.pool.clone(), &state.config);
    let response = controller.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            response,
            "User registered successfully".to_string(),
        )),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let controller = UserController::new(state.pool.clone(), &state.config);
    let response = controller.login(request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.pool.clone(), &state.config);
    let response = controller.get_profile(user.user_id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.pool.clone(), &state.config);
    let response = controller.update_profile(user.user_id, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// Los JWT son stateless: el logout solo confirma que el cliente debe
/// descartar el token
async fn logout(
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success_with_message(
        json!({ "user_id": user.user_id }),
        "Logged out successfully".to_string(),
    ))
}

async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.pool.clone(), &state.config);
    let response = controller.get_by_id(&user, id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn update_user_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.pool.clone(), &state.config);
    let response = controller.update_profile_for(&user, id, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn update_user_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserStatusRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.pool.clone(), &state.config);
    let response = controller.set_status(&user, id, request.is_active).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = UserController::new(state.pool.clone(), &state.config);
    controller.delete(&user, id).await?;
    Ok(Json(ApiResponse::message_only(
        "User deleted successfully".to_string(),
    )))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let controller = UserController::new(state.pool.clone(), &state.config);
    let (users, pagination) = controller.list(&user, query).await?;
    Ok(Json(ApiResponse::success(json!({
        "users": users,
        "pagination": pagination,
    }))))
}
