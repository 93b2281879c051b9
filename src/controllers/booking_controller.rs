//! Controller de reservas: ciclo de vida completo
//!
//! Orquesta la creación con chequeo de conflictos, la cancelación con
//! ventana de 24h y las transiciones de estado de admin. Las reglas puras
//! viven en models::booking; aquí solo se aplican.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::environment::EnvironmentConfig;
use crate::dto::booking_dto::{
    BookingListQuery, BookingResponse, CreateBookingRequest, MyBookingsQuery,
    UpdateBookingRequest, UpdateBookingStatusRequest,
};
use crate::dto::common_dto::{PageParams, Pagination};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::{within_cancellation_window, Booking, BookingStatus};
use crate::repositories::booking_repository::BookingRepository;
use crate::services::notification_dispatcher::NotificationDispatcher;
use crate::utils::errors::AppError;

pub struct BookingController {
    repository: BookingRepository,
    dispatcher: NotificationDispatcher,
    strict_transitions: bool,
}

impl BookingController {
    pub fn new(
        pool: PgPool,
        config: &EnvironmentConfig,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            repository: BookingRepository::new(pool),
            dispatcher,
            strict_transitions: config.strict_status_transitions,
        }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateBookingRequest,
    ) -> Result<BookingResponse, AppError> {
        request.validate()?;

        if request.start_date >= request.end_date {
            return Err(AppError::BadRequest(
                "End date must be after start date".to_string(),
            ));
        }
        if request.start_date < Utc::now().date_naive() {
            return Err(AppError::BadRequest(
                "Start date cannot be in the past".to_string(),
            ));
        }

        let booking = self
            .repository
            .create_reserved(
                user_id,
                request.car_id,
                request.start_date,
                request.end_date,
                request.pickup_location,
                request.dropoff_location,
            )
            .await?;

        self.dispatcher.booking_created(&booking).await;
        Ok(booking.into())
    }

    pub async fn get_by_id(
        &self,
        acting_user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<BookingResponse, AppError> {
        let booking = self
            .repository
            .find_by_id_scoped(id, acting_user.owner_scope())
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        Ok(booking.into())
    }

    pub async fn my_bookings(
        &self,
        user_id: Uuid,
        query: MyBookingsQuery,
    ) -> Result<(Vec<BookingResponse>, Pagination), AppError> {
        if let Some(ref status) = query.status {
            if BookingStatus::from_str(status).is_none() {
                return Err(AppError::BadRequest("Invalid status".to_string()));
            }
        }

        let params = PageParams {
            page: query.page,
            limit: query.limit,
        };

        let (bookings, total) = self
            .repository
            .list_by_user(user_id, query.status.as_deref(), params.limit(), params.offset())
            .await?;

        let pagination = Pagination::new(params.page(), params.limit(), total);
        Ok((bookings.into_iter().map(Into::into).collect(), pagination))
    }

    pub async fn list_all(
        &self,
        acting_user: &AuthenticatedUser,
        query: BookingListQuery,
    ) -> Result<(Vec<BookingResponse>, Pagination), AppError> {
        acting_user.require_admin()?;

        if let Some(ref status) = query.status {
            if BookingStatus::from_str(status).is_none() {
                return Err(AppError::BadRequest("Invalid status".to_string()));
            }
        }

        let params = PageParams {
            page: query.page,
            limit: query.limit,
        };

        let (bookings, total) = self
            .repository
            .list_all(
                query.status.as_deref(),
                query.user_id,
                query.car_id,
                query.start_date,
                query.end_date,
                params.limit(),
                params.offset(),
            )
            .await?;

        let pagination = Pagination::new(params.page(), params.limit(), total);
        Ok((bookings.into_iter().map(Into::into).collect(), pagination))
    }

    /// Actualización de fechas y puntos de recogida/entrega.
    /// Si cambian las fechas se repite el chequeo de conflictos excluyendo
    /// la propia reserva.
    pub async fn update(
        &self,
        acting_user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateBookingRequest,
    ) -> Result<BookingResponse, AppError> {
        request.validate()?;

        let booking = self
            .repository
            .find_by_id_scoped(id, acting_user.owner_scope())
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let status = parse_status(&booking)?;
        if status.is_terminal() {
            return Err(AppError::InvalidState(
                "Cannot update a completed or cancelled booking".to_string(),
            ));
        }

        let start_date = request.start_date.unwrap_or(booking.start_date);
        let end_date = request.end_date.unwrap_or(booking.end_date);
        let dates_changed = start_date != booking.start_date || end_date != booking.end_date;

        if dates_changed {
            if start_date >= end_date {
                return Err(AppError::BadRequest(
                    "End date must be after start date".to_string(),
                ));
            }
            if start_date < Utc::now().date_naive() {
                return Err(AppError::BadRequest(
                    "Start date cannot be in the past".to_string(),
                ));
            }
            if self
                .repository
                .has_conflict_excluding(booking.car_id, start_date, end_date, booking.id)
                .await?
            {
                return Err(AppError::Conflict(
                    "Car is already booked for the selected dates".to_string(),
                ));
            }
        }

        let updated = self
            .repository
            .update_fields(
                booking.id,
                start_date,
                end_date,
                request.pickup_location.unwrap_or(booking.pickup_location),
                request.dropoff_location.unwrap_or(booking.dropoff_location),
            )
            .await?;

        Ok(updated.into())
    }

    /// Cancelación por el flujo de usuario: solo pending/confirmed y con
    /// al menos 24h de antelación a la fecha de inicio.
    pub async fn cancel(
        &self,
        acting_user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<BookingResponse, AppError> {
        let booking = self
            .repository
            .find_by_id_scoped(id, acting_user.owner_scope())
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let status = parse_status(&booking)?;
        if !status.is_cancellable() {
            return Err(AppError::InvalidState(
                "Booking cannot be cancelled".to_string(),
            ));
        }

        if !within_cancellation_window(booking.start_date, Utc::now()) {
            return Err(AppError::InvalidState(
                "Booking can only be cancelled at least 24 hours before start date".to_string(),
            ));
        }

        let cancelled = self.repository.cancel(booking.id).await?;
        self.dispatcher.booking_cancelled(&cancelled).await;
        Ok(cancelled.into())
    }

    /// Cambio directo de estado (admin). En modo estricto solo se aceptan
    /// transiciones del grafo; en modo normal cualquier estado conocido.
    pub async fn update_status(
        &self,
        acting_user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateBookingStatusRequest,
    ) -> Result<BookingResponse, AppError> {
        acting_user.require_admin()?;

        let next = BookingStatus::from_str(&request.status)
            .ok_or_else(|| AppError::BadRequest("Invalid status".to_string()))?;

        let booking = self
            .repository
            .find_by_id_scoped(id, None)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let current = parse_status(&booking)?;
        if self.strict_transitions && !current.can_transition_to(next) {
            return Err(AppError::InvalidState(format!(
                "Cannot transition booking from {} to {}",
                current.as_str(),
                next.as_str()
            )));
        }

        let now = Utc::now();
        let cancelled_at = (next == BookingStatus::Cancelled).then_some(now);
        let completed_at = (next == BookingStatus::Completed).then_some(now);

        let updated = self
            .repository
            .set_status(booking.id, next.as_str(), cancelled_at, completed_at)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        match next {
            BookingStatus::Confirmed => self.dispatcher.booking_confirmed(&updated).await,
            BookingStatus::Cancelled => self.dispatcher.booking_cancelled(&updated).await,
            _ => {}
        }

        Ok(updated.into())
    }
}

fn parse_status(booking: &Booking) -> Result<BookingStatus, AppError> {
    booking
        .status()
        .ok_or_else(|| AppError::Internal(format!("Unknown booking status: {}", booking.status)))
}
