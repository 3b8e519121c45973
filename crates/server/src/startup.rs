use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use service::animal::repo::seaorm::SeaOrmAnimalRepository;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::{routes, state::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load `.env`, then `config.toml` (or `CONFIG_PATH`). Environment
/// variables are used only when the file does not exist.
pub fn load_config() -> anyhow::Result<AppConfig> {
    dotenv().ok();
    let path = configs::config_path();
    if !std::path::Path::new(&path).exists() {
        warn!(%path, "config file not found, using environment");
    }
    AppConfig::load_file_or_env(&path)
}

/// Resolves when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for Ctrl+C; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
}

/// Public entry: connect, migrate, build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    // DB connection
    let db = connect_with_config(&DatabaseConfig::from(&cfg.database)).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!(event = "migrations_applied", "database schema up to date");
    }

    let repo = Arc::new(SeaOrmAnimalRepository { db });
    let state = ServerState::with_repository(repo);
    let app: Router = routes::build_router(state, build_cors());

    // Bind and serve
    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "starting animals server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!(event = "stop", "server stopped");
    Ok(())
}
