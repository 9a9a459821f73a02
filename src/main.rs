use std::sync::Arc;

use taskease::{
    api::{build_router, ApiState},
    auth::{LoginService, RegistrationService, SessionService},
    notifier::{LogNotifier, Notifier, SmtpNotifier},
    observability::init_tracing,
    storage::{create_pool, repositories::SqlxUserRepository, run_migrations},
    AppConfig, Result, APP_NAME, VERSION,
};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing).
    // This must happen before any config is read from environment.
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    // Tracing first so configuration warnings are not lost.
    let observability = taskease::config::ObservabilityConfig::from_env();
    init_tracing(&observability)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting TaskEase backend");

    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database).await?;
    if config.database.auto_migrate {
        run_migrations(&pool).await?;
    }

    let notifier: Arc<dyn Notifier> = if config.notifier.smtp_configured() {
        Arc::new(SmtpNotifier::from_config(&config.notifier)?)
    } else {
        warn!("No SMTP relay configured; verification links will only be logged");
        Arc::new(LogNotifier::new(config.notifier.app_url.clone()))
    };

    let users = Arc::new(SqlxUserRepository::new(pool));
    let session = Arc::new(SessionService::new(config.auth.session_secret.as_bytes()));

    let state = ApiState {
        registration: RegistrationService::new(users.clone(), notifier.clone()),
        login: LoginService::new(users.clone(), session.clone(), notifier),
        session,
        users,
    };

    let router = build_router(state, &config.server);

    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(taskease::Error::Io)?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => warn!(error = %err, "Failed to listen for shutdown signal"),
    }
}
