use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use car_rental::config::environment::EnvironmentConfig;
use car_rental::database::connection::mask_database_url;
use car_rental::database::create_pool;
use car_rental::services::email_service::MockEmailSender;
use car_rental::services::payment_gateway::MockPaymentGateway;
use car_rental::state::AppState;
use car_rental::create_app;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::default();

    // Configurar logging: DEBUG en desarrollo, INFO en el resto
    let log_level = if config.is_development() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("🚗 Car Rental Platform - API");
    info!("============================");

    // Inicializar base de datos
    if let Ok(url) = std::env::var("DATABASE_URL") {
        info!("🗄️ Base de datos: {}", mask_database_url(&url));
    }
    let pool = match create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    info!("✅ Pool de Postgres listo");

    // Capabilities inyectadas: pasarela mock y email mock
    let email = Arc::new(MockEmailSender::new(config.email_from.clone()));
    let gateway = Arc::new(MockPaymentGateway);

    let app_state = AppState::new(pool, config.clone(), email, gateway);
    let app = create_app(app_state);

    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("👤 Endpoints - Users:");
    info!("   POST /api/users/register - Registrar usuario");
    info!("   POST /api/users/login - Login");
    info!("   GET  /api/users/profile - Perfil actual");
    info!("   PUT  /api/users/profile - Actualizar perfil");
    info!("   POST /api/users/logout - Logout");
    info!("   GET  /api/users - Listar usuarios (admin)");
    info!("   GET  /api/users/:id - Obtener usuario (admin)");
    info!("   PUT  /api/users/:id/profile - Editar perfil de usuario (admin)");
    info!("   PUT  /api/users/:id/status - Activar/desactivar cuenta (admin)");
    info!("   DELETE /api/users/:id - Eliminar usuario (admin)");
    info!("🚗 Endpoints - Cars:");
    info!("   GET  /api/cars - Listar coches");
    info!("   GET  /api/cars/search - Buscar por disponibilidad");
    info!("   GET  /api/cars/:id - Obtener coche");
    info!("   POST /api/cars - Crear coche (admin)");
    info!("   PUT  /api/cars/:id - Actualizar coche (admin)");
    info!("   PUT  /api/cars/:id/availability - Cambiar disponibilidad (admin)");
    info!("   DELETE /api/cars/:id - Eliminar coche (admin)");
    info!("📅 Endpoints - Bookings:");
    info!("   POST /api/bookings - Crear reserva");
    info!("   GET  /api/bookings/my-bookings - Mis reservas");
    info!("   GET  /api/bookings/:id - Obtener reserva");
    info!("   PUT  /api/bookings/:id - Actualizar reserva");
    info!("   POST /api/bookings/:id/cancel - Cancelar reserva");
    info!("   GET  /api/bookings - Listar reservas (admin)");
    info!("   PUT  /api/bookings/:id/status - Cambiar estado (admin)");
    info!("💳 Endpoints - Payments:");
    info!("   POST /api/payments/process - Procesar pago");
    info!("   GET  /api/payments/booking/:bookingId - Pago por reserva");
    info!("   GET  /api/payments/:id - Obtener pago");
    info!("   GET  /api/payments - Listar pagos (admin)");
    info!("   POST /api/payments/:id/refund - Refund (admin)");
    info!("🔔 Endpoints - Notifications:");
    info!("   GET  /api/notifications/my-notifications - Mis notificaciones");
    info!("   PUT  /api/notifications/:id/read - Marcar como leída");
    info!("   DELETE /api/notifications/:id - Eliminar notificación");
    info!("   GET  /api/notifications - Listar notificaciones (admin)");
    info!("   POST /api/notifications/send - Enviar notificación (admin)");
    info!("   POST /api/notifications/broadcast - Broadcast (admin)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal SIGTERM recibida, apagando servidor...");
        },
    }
}
