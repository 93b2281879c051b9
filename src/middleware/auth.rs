//! Middleware de autenticación JWT
//!
//! Decodifica el bearer token y deja un `AuthenticatedUser {user_id, role}`
//! en las extensions del request. El contexto de auth siempre viaja como
//! parámetro a los controllers, nunca como estado ambiental.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::{extract_token_from_header, verify_token, JwtConfig};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Insufficient permissions".to_string()))
        }
    }

    /// Scope de owner para las queries: un admin ve todo (None), el resto
    /// solo sus propias filas
    pub fn owner_scope(&self) -> Option<Uuid> {
        if self.is_admin() {
            None
        } else {
            Some(self.user_id)
        }
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;

    let token = extract_token_from_header(auth_header)?;

    let jwt_config = JwtConfig::from(&state.config);
    let claims = verify_token(token, &jwt_config)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;
    let role = UserRole::from_str(&claims.role)
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email,
        role,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::EnvironmentConfig;
    use crate::services::email_service::MockEmailSender;
    use crate::services::payment_gateway::MockPaymentGateway;
    use crate::utils::jwt::generate_token;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Extension, Router};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let pool = sqlx::PgPool::connect_lazy("postgres://postgres@localhost/test")
            .expect("lazy pool");
        let config = EnvironmentConfig {
            environment: "test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiration: 3600,
            cors_origins: vec!["*".to_string()],
            strict_status_transitions: false,
            email_from: "test@test.local".to_string(),
        };
        AppState::new(
            pool,
            config,
            Arc::new(MockEmailSender::new("test@test.local".to_string())),
            Arc::new(MockPaymentGateway),
        )
    }

    fn protected_app(state: AppState) -> Router {
        Router::new()
            .route(
                "/protected",
                get(|Extension(user): Extension<AuthenticatedUser>| async move {
                    user.user_id.to_string()
                }),
            )
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let app = protected_app(test_state());
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_token_rejected() {
        let app = protected_app(test_state());
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/protected")
                    .header("Authorization", "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_injects_user() {
        let state = test_state();
        let user_id = Uuid::new_v4();
        let token = generate_token(
            user_id,
            "user@example.com",
            "user",
            &JwtConfig::from(&state.config),
        )
        .unwrap();

        let app = protected_app(state);
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[test]
    fn test_owner_scope() {
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "u@example.com".to_string(),
            role: UserRole::User,
        };
        assert_eq!(user.owner_scope(), Some(user.user_id));
        assert!(user.require_admin().is_err());

        let admin = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            role: UserRole::Admin,
        };
        assert_eq!(admin.owner_scope(), None);
        assert!(admin.require_admin().is_ok());
    }
}
