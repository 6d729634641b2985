//! FCRP role sync service entry point.
//!
//! Serves the sync and permission API over HTTP, resolving roles against
//! the Discord REST API on demand.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fcrp_roles::config::AppConfig;
use fcrp_roles::database::Database;
use fcrp_roles::directory::DiscordDirectory;
use fcrp_roles::error::{Result, RoleSyncError};
use fcrp_roles::fetcher::RoleFetcher;
use fcrp_roles::resolver::RoleResolver;
use fcrp_roles::session::SessionManager;
use fcrp_roles::sync::SyncOrchestrator;
use fcrp_roles::web::{self, AppState};

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // RUST_LOG controls verbosity, e.g. RUST_LOG=fcrp_roles=debug
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        built = env!("BUILD_TIMESTAMP"),
        commit = env!("GIT_COMMIT"),
        "FCRP role sync starting"
    );

    let config = AppConfig::from_env()?;
    tracing::info!(
        role_mappings = config.mappings.roles.entries().len(),
        department_mappings = config.mappings.departments.entries().len(),
        "Configuration loaded"
    );

    let db = Arc::new(Database::new(&config.database_path).await?);
    tracing::info!(path = %config.database_path, "Database initialized");

    let directory = Arc::new(DiscordDirectory::new(
        config.discord_api_base.clone(),
        config.discord_token.clone(),
        config.requests_per_second,
    )?);
    let fetcher = Arc::new(RoleFetcher::new(directory, config.retry));
    let resolver = Arc::new(RoleResolver::new(
        fetcher,
        config.mappings.clone(),
        config.guilds.clone(),
    ));
    let orchestrator = Arc::new(SyncOrchestrator::new(db.clone(), resolver.clone()));
    let sessions = Arc::new(SessionManager::new(db.clone()));

    spawn_session_cleanup(sessions.clone());

    let router = web::build_router(AppState {
        db,
        sessions,
        resolver,
        orchestrator,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.web_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RoleSyncError::Config(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!(port = config.web_port, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RoleSyncError::Config(format!("HTTP server error: {}", e)))?;

    tracing::info!("FCRP role sync stopped");
    Ok(())
}

fn spawn_session_cleanup(sessions: Arc<SessionManager>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match sessions.cleanup_expired().await {
                Ok(count) if count > 0 => {
                    tracing::info!(count = count, "Cleaned up expired sessions");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Failed to cleanup sessions");
                }
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
