//! Ensamblado del router de la API

pub mod booking_routes;
pub mod car_routes;
pub mod notification_routes;
pub mod payment_routes;
pub mod user_routes;

use axum::{middleware, Router};

use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

/// Router completo bajo /api. Las rutas públicas van sin middleware; el
/// resto pasa por el de autenticación JWT.
pub fn create_api_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/users", user_routes::create_user_router())
        .nest("/cars", car_routes::create_car_router())
        .nest("/bookings", booking_routes::create_booking_router())
        .nest("/payments", payment_routes::create_payment_router())
        .nest(
            "/notifications",
            notification_routes::create_notification_router(),
        )
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    let public = Router::new()
        .nest("/users", user_routes::create_public_user_router())
        .nest("/cars", car_routes::create_public_car_router());

    public.merge(protected)
}
