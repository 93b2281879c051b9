//! Tests de integración contra Postgres.
//!
//! Cubren las reglas que viven en SQL y en transacciones: el chequeo de
//! conflictos al crear reservas, el pago exactly-once y la atomicidad
//! refund + cancelación. Cada test corre sobre una base de datos limpia
//! creada por `#[sqlx::test]` con las migraciones aplicadas.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use car_rental::config::environment::EnvironmentConfig;
use car_rental::controllers::payment_controller::{ChargeResult, PaymentController};
use car_rental::controllers::user_controller::UserController;
use car_rental::dto::car_dto::CreateCarRequest;
use car_rental::dto::payment_dto::ProcessPaymentRequest;
use car_rental::dto::user_dto::{LoginRequest, RegisterRequest};
use car_rental::middleware::auth::AuthenticatedUser;
use car_rental::models::booking::Booking;
use car_rental::models::car::Car;
use car_rental::models::user::{User, UserRole};
use car_rental::repositories::booking_repository::BookingRepository;
use car_rental::repositories::car_repository::CarRepository;
use car_rental::repositories::payment_repository::PaymentRepository;
use car_rental::repositories::user_repository::UserRepository;
use car_rental::services::email_service::MockEmailSender;
use car_rental::services::notification_dispatcher::NotificationDispatcher;
use car_rental::services::payment_gateway::MockPaymentGateway;
use car_rental::utils::errors::AppError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        environment: "test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiration: 3600,
        cors_origins: vec![],
        strict_status_transitions: false,
        email_from: "noreply@test.local".to_string(),
    }
}

fn admin() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::new_v4(),
        email: "admin@example.com".to_string(),
        role: UserRole::Admin,
    }
}

async fn seed_user(pool: &PgPool) -> User {
    UserRepository::new(pool.clone())
        .create(
            format!("user-{}@example.com", Uuid::new_v4().simple()),
            "$2b$12$not-a-real-hash".to_string(),
            "Ana".to_string(),
            "García".to_string(),
            None,
            None,
            None,
            "user".to_string(),
        )
        .await
        .unwrap()
}

async fn seed_car(pool: &PgPool, daily_rate: Decimal) -> Car {
    CarRepository::new(pool.clone())
        .create(CreateCarRequest {
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2023,
            license_plate: format!("TST-{}", &Uuid::new_v4().simple().to_string()[..6]),
            color: "white".to_string(),
            category: "compact".to_string(),
            transmission: "automatic".to_string(),
            fuel_type: "hybrid".to_string(),
            seats: 5,
            daily_rate,
            features: vec![],
            image_url: None,
            location: "Madrid".to_string(),
        })
        .await
        .unwrap()
}

fn payment_controller(pool: &PgPool) -> PaymentController {
    let email = Arc::new(MockEmailSender::new("noreply@test.local".to_string()));
    PaymentController::new(
        pool.clone(),
        Arc::new(MockPaymentGateway),
        NotificationDispatcher::new(pool.clone(), email),
    )
}

async fn seed_pending_booking(pool: &PgPool, user: &User, car: &Car) -> Booking {
    BookingRepository::new(pool.clone())
        .create_reserved(
            user.id,
            car.id,
            date(2099, 3, 15),
            date(2099, 3, 18),
            "Airport Terminal 1".to_string(),
            "Airport Terminal 1".to_string(),
        )
        .await
        .unwrap()
}

fn charge_request(booking_id: Uuid) -> ProcessPaymentRequest {
    ProcessPaymentRequest {
        booking_id,
        payment_method: "credit_card".to_string(),
        card_number: Some("4111111111111111".to_string()),
        card_holder_name: Some("Ana García".to_string()),
        expiry_month: Some(12),
        expiry_year: Some(2099),
        cvv: Some("123".to_string()),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_overlapping_booking_rejected_disjoint_accepted(pool: PgPool) {
    let user = seed_user(&pool).await;
    let car = seed_car(&pool, Decimal::from(50)).await;
    let bookings = BookingRepository::new(pool.clone());

    // Reserva confirmada [03-10, 03-15)
    let existing = bookings
        .create_reserved(
            user.id,
            car.id,
            date(2099, 3, 10),
            date(2099, 3, 15),
            "Airport Terminal 1".to_string(),
            "Airport Terminal 1".to_string(),
        )
        .await
        .unwrap();
    bookings
        .set_status(existing.id, "confirmed", None, None)
        .await
        .unwrap();

    // [03-14, 03-18) solapa: rechazada con Conflict
    let overlapping = bookings
        .create_reserved(
            user.id,
            car.id,
            date(2099, 3, 14),
            date(2099, 3, 18),
            "Airport Terminal 1".to_string(),
            "Airport Terminal 1".to_string(),
        )
        .await;
    assert!(matches!(overlapping, Err(AppError::Conflict(_))));

    // [03-15, 03-18) empieza el día que la otra termina: aceptada,
    // 3 días a 50 son 150
    let disjoint = bookings
        .create_reserved(
            user.id,
            car.id,
            date(2099, 3, 15),
            date(2099, 3, 18),
            "Airport Terminal 1".to_string(),
            "Airport Terminal 1".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(disjoint.status, "pending");
    assert_eq!(disjoint.total_amount, Decimal::from(150));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_payment_is_exactly_once(pool: PgPool) {
    let user = seed_user(&pool).await;
    let car = seed_car(&pool, Decimal::from(50)).await;
    let booking = seed_pending_booking(&pool, &user, &car).await;
    let controller = payment_controller(&pool);

    // Primer cobro: aprobado y la reserva pasa a confirmed en la misma
    // transacción
    let first = controller
        .process(user.id, charge_request(booking.id))
        .await
        .unwrap();
    let payment = match first {
        ChargeResult::Approved(payment) => payment,
        ChargeResult::Declined { message, .. } => panic!("charge declined: {}", message),
    };
    assert_eq!(payment.status, "completed");

    let confirmed = BookingRepository::new(pool.clone())
        .find_by_id_scoped(booking.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(confirmed.status, "confirmed");

    assert!(PaymentRepository::new(pool.clone())
        .completed_exists_for_booking(booking.id)
        .await
        .unwrap());

    // Segundo cobro sobre la misma reserva: rechazado sea cual sea la
    // tarjeta
    let second = controller.process(user.id, charge_request(booking.id)).await;
    assert!(matches!(second, Err(AppError::InvalidState(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refund_cancels_booking_atomically(pool: PgPool) {
    let user = seed_user(&pool).await;
    let car = seed_car(&pool, Decimal::from(50)).await;
    let booking = seed_pending_booking(&pool, &user, &car).await;
    let controller = payment_controller(&pool);

    let payment = match controller
        .process(user.id, charge_request(booking.id))
        .await
        .unwrap()
    {
        ChargeResult::Approved(payment) => payment,
        ChargeResult::Declined { message, .. } => panic!("charge declined: {}", message),
    };

    let refunded = controller
        .refund(
            &admin(),
            payment.id,
            car_rental::dto::payment_dto::RefundRequest { reason: None },
        )
        .await
        .unwrap();

    assert_eq!(refunded.status, "refunded");
    assert_eq!(refunded.refund_reason.as_deref(), Some("Admin refund"));
    assert!(refunded
        .refund_transaction_id
        .as_deref()
        .unwrap()
        .starts_with("rfnd_"));

    // La reserva quedó cancelada en la misma transacción
    let cancelled = BookingRepository::new(pool.clone())
        .find_by_id_scoped(booking.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cancelled.status, "cancelled");
    assert!(cancelled.cancelled_at.is_some());

    // Un segundo refund se rechaza
    let again = controller
        .refund(
            &admin(),
            payment.id,
            car_rental::dto::payment_dto::RefundRequest { reason: None },
        )
        .await;
    assert!(matches!(again, Err(AppError::InvalidState(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_disabled_account_cannot_login(pool: PgPool) {
    let config = test_config();
    let users = UserController::new(pool.clone(), &config);

    let registered = users
        .register(RegisterRequest {
            email: "ana@example.com".to_string(),
            password: "secret123".to_string(),
            first_name: "Ana".to_string(),
            last_name: "García".to_string(),
            phone: None,
            date_of_birth: None,
            license_number: None,
            role: None,
        })
        .await
        .unwrap();

    // El admin desactiva la cuenta
    let disabled = users
        .set_status(&admin(), registered.user.id, false)
        .await
        .unwrap();
    assert!(!disabled.is_active);

    // Credenciales correctas pero cuenta desactivada
    let login = users
        .login(LoginRequest {
            email: "ana@example.com".to_string(),
            password: "secret123".to_string(),
        })
        .await;
    assert!(matches!(login, Err(AppError::Forbidden(_))));
}
