//! Application bootstrap.
//!
//! Composes the process in a fixed order: configuration, connection pool,
//! entity registry, optional schema synchronization, feature modules, HTTP
//! router, listener.

use axum::Router;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::{create_router, AppState};
use common::{AppConfig, ConfigError, LogConfig};
use database::{Database, EntityRegistry};
use users::UsersModule;

/// Errors that abort startup or stop the server.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Install the global tracing subscriber.
pub fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_new(&log.filter)
        .unwrap_or_else(|_| EnvFilter::new(common::config::DEFAULT_LOG_FILTER));

    if log.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Every schema object owned by the application's feature modules.
pub fn entity_registry() -> EntityRegistry {
    let mut registry = EntityRegistry::new();
    UsersModule::register_entities(&mut registry);
    registry
}

/// Connect, optionally synchronize the schema, and build the router.
pub async fn bootstrap(config: &AppConfig) -> Result<Router, StartupError> {
    let database = Database::connect(&config.database).await?;

    let registry = entity_registry();
    if config.database.synchronize {
        warn!("DATABASE_SYNCHRONIZE is enabled; schema auto-synchronization is unsafe for production");
        let report = registry.synchronize(database.connection()).await?;
        info!(
            created = ?report.created,
            existing = report.existing.len(),
            "Schema synchronized"
        );
    }

    let users = UsersModule::new(database.get_connection());
    let state = AppState::new(database, users.repository());

    Ok(create_router(state))
}

/// Bootstrap and serve until the process is terminated.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let app = bootstrap(&config).await?;

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Serving on http://{}", addr);
    info!("API docs at http://{}/api", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
