//! Controller de usuarios y autenticación

use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::environment::EnvironmentConfig;
use crate::dto::common_dto::{PageParams, Pagination};
use crate::dto::user_dto::{
    AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest, UserListQuery, UserResponse,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::UserRole;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct UserController {
    repository: UserRepository,
    jwt_config: JwtConfig,
}

impl UserController {
    pub fn new(pool: PgPool, config: &EnvironmentConfig) -> Self {
        Self {
            repository: UserRepository::new(pool),
            jwt_config: JwtConfig::from(config),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        if self.repository.email_exists(&request.email).await? {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        // Solo se concede admin si viene explícito
        let role = match request.role.as_deref() {
            Some("admin") => UserRole::Admin,
            _ => UserRole::User,
        };

        let password_hash = hash(&request.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Error hashing password: {}", e)))?;

        let user = self
            .repository
            .create(
                request.email,
                password_hash,
                request.first_name,
                request.last_name,
                request.phone,
                request.date_of_birth,
                request.license_number,
                role.as_str().to_string(),
            )
            .await?;

        let token = generate_token(user.id, &user.email, &user.role, &self.jwt_config)?;

        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        let user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Error verifying password: {}", e)))?;

        if !valid {
            return Err(AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        let token = generate_token(user.id, &user.email, &user.role, &self.jwt_config)?;

        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserResponse, AppError> {
        request.validate()?;
        self.apply_profile_update(user_id, request).await
    }

    /// Consulta de un usuario concreto (admin)
    pub async fn get_by_id(
        &self,
        acting_user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<UserResponse, AppError> {
        acting_user.require_admin()?;

        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    /// Edición del perfil de otro usuario (admin)
    pub async fn update_profile_for(
        &self,
        acting_user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserResponse, AppError> {
        acting_user.require_admin()?;
        request.validate()?;
        self.apply_profile_update(id, request).await
    }

    /// Activar o desactivar una cuenta (admin). Una cuenta desactivada
    /// no puede hacer login.
    pub async fn set_status(
        &self,
        acting_user: &AuthenticatedUser,
        id: Uuid,
        is_active: bool,
    ) -> Result<UserResponse, AppError> {
        acting_user.require_admin()?;

        let user = self
            .repository
            .set_active(id, is_active)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    pub async fn delete(&self, acting_user: &AuthenticatedUser, id: Uuid) -> Result<(), AppError> {
        acting_user.require_admin()?;

        if acting_user.user_id == id {
            return Err(AppError::BadRequest(
                "Cannot delete your own account".to_string(),
            ));
        }

        let deleted = self.repository.delete(id).await?;
        if !deleted {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn apply_profile_update(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserResponse, AppError> {
        let current = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let user = self
            .repository
            .update_profile(
                user_id,
                request.first_name.unwrap_or(current.first_name),
                request.last_name.unwrap_or(current.last_name),
                request.phone.or(current.phone),
                request.date_of_birth.or(current.date_of_birth),
                request.license_number.or(current.license_number),
            )
            .await?;

        Ok(user.into())
    }

    pub async fn list(
        &self,
        acting_user: &AuthenticatedUser,
        query: UserListQuery,
    ) -> Result<(Vec<UserResponse>, Pagination), AppError> {
        acting_user.require_admin()?;

        if let Some(ref role) = query.role {
            if UserRole::from_str(role).is_none() {
                return Err(AppError::BadRequest("Invalid role".to_string()));
            }
        }

        let params = PageParams {
            page: query.page,
            limit: query.limit,
        };

        let (users, total) = self
            .repository
            .list(
                query.search.as_deref().filter(|s| !s.is_empty()),
                query.role.as_deref(),
                params.limit(),
                params.offset(),
            )
            .await?;

        let pagination = Pagination::new(params.page(), params.limit(), total);
        Ok((users.into_iter().map(Into::into).collect(), pagination))
    }
}
