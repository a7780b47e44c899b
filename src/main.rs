use customer_records::config::{Config, StorageBackend};
use customer_records::db::Database;
use customer_records::db_storage::{CustomerStorage, InMemoryCustomerStorage, PgCustomerStorage};
use customer_records::handlers::{self, AppState};
use customer_records::services::CustomerService;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes logging, loads configuration (failing fast without a database
/// endpoint), prepares the lazily-connected storage and starts the Axum server.
/// The database connection itself is opened by the first request that needs it.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "customer_records=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let storage: Arc<dyn CustomerStorage> = match config.storage_backend {
        StorageBackend::Postgres => {
            let db = Arc::new(Database::new(&config));
            tracing::info!("Database connection will be established on first use");
            Arc::new(PgCustomerStorage::new(db))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, records are lost on exit");
            Arc::new(InMemoryCustomerStorage::new())
        }
    };

    let app_state = Arc::new(AppState {
        customers: CustomerService::new(storage),
    });
    let app = handlers::router(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
