use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use fleet_api::config::ServerConfig;
use fleet_api::router::build_app_router;
use fleet_api::state::AppState;
use fleet_api::ws::{self, SubscriberRegistry};
use fleet_db::{PgChangeFeed, PgVehicleStore};
use fleet_events::ChangeNotifier;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "fleet_api=debug,fleet_events=debug,fleet_db=info,tower_http=debug";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.json_logs);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Everything that can abort startup or serving.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] fleet_api::config::ConfigError),
    #[error("database: {0}")]
    Database(#[from] fleet_db::StoreError),
    #[error("migrations: {0}")]
    Migrate(String),
    #[error("invalid bind address '{0}'")]
    Address(String),
    #[error("server i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Notifier(#[from] fleet_events::NotifierError),
}

async fn run(config: ServerConfig) -> Result<(), StartupError> {
    tracing::info!(
        host = %config.host,
        port = config.port,
        environment = %config.environment,
        "Loaded server configuration",
    );

    // --- Database ---
    let pool = fleet_db::create_pool(&config.database_url)
        .await
        .map_err(fleet_db::StoreError::from)?;
    tracing::info!("Database connection pool created");

    fleet_db::health_check(&pool)
        .await
        .map_err(fleet_db::StoreError::from)?;
    tracing::info!("Database health check passed");

    fleet_db::run_migrations(&pool)
        .await
        .map_err(|e| StartupError::Migrate(e.to_string()))?;
    tracing::info!("Database migrations applied");

    let store = Arc::new(PgVehicleStore::new(pool.clone()));
    let feed = Arc::new(PgChangeFeed::new(pool));

    // --- Subscriber registry and heartbeat ---
    let registry = Arc::new(SubscriberRegistry::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&registry));

    // --- Change notifier ---
    let notifier_cancel = CancellationToken::new();
    let notifier = Arc::new(
        ChangeNotifier::new(feed, registry.clone()).with_event_name(config.change_event_name.clone()),
    );
    let notifier_handle = notifier.start(notifier_cancel.clone())?;
    tracing::info!(event_name = notifier.event_name(), "Change notifier started");

    // --- App state and router ---
    let addr = SocketAddr::new(
        config
            .host
            .parse()
            .map_err(|_| StartupError::Address(config.host.clone()))?,
        config.port,
    );

    let state = AppState {
        store,
        config: Arc::new(config),
        registry: Arc::clone(&registry),
    };
    let app = build_app_router(state)?;

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    notifier_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), notifier_handle).await;
    tracing::info!("Change notifier stopped");

    let ws_count = registry.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    registry.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). If a handler cannot
/// be installed that branch never fires, leaving the other one in charge.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
