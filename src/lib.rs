//! Car Rental Platform - backend de reservas de coches
//!
//! CRUD de usuarios, coches, reservas, pagos y notificaciones sobre
//! Postgres, con el motor de disponibilidad y el ciclo de vida de las
//! reservas como núcleo.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{response::Json, routing::get, Router};
use serde_json::json;

use middleware::cors::{cors_middleware, cors_middleware_with_origins};
use state::AppState;

/// Router completo de la aplicación: /health + /api con CORS.
/// En producción el CORS se restringe a los orígenes configurados.
pub fn create_app(state: AppState) -> Router {
    let cors = if state.config.is_production() {
        cors_middleware_with_origins(state.config.cors_origins.clone())
    } else {
        cors_middleware()
    };

    Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api", routes::create_api_router(state.clone()))
        .layer(cors)
        .with_state(state)
}

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "car-rental-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
