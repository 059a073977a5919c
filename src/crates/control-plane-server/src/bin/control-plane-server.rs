//! Entry point, grounded on `orchestrator-server.rs`'s `main`/`shutdown_signal`
//! shape: init tracing, load config, connect the pool, wire the repositories
//! and scenario service into `AppState`, serve with graceful shutdown.

use control_plane_server::config::ServerConfig;
use control_plane_server::routes::create_router;
use control_plane_server::state::AppState;
use repository::{SqliteScenarioRepository, SqliteSessionRepository, SqliteUserFlowRepository};
use scenario_exec::{ScenarioExecutionService, SyntheticDriverFactory};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    let config = ServerConfig::load()?;
    tracing::info!(host = %config.http.host, port = config.http.port, "configuration loaded");

    let pool = repository::connect(&config.database.url).await?;

    let scenario_repo = Arc::new(SqliteScenarioRepository::new(pool.clone()));
    let flow_repo = Arc::new(SqliteUserFlowRepository::new(pool.clone()));
    let session_repo = Arc::new(SqliteSessionRepository::new(pool.clone()));

    let scenario_service = Arc::new(ScenarioExecutionService::new(
        scenario_repo.clone(),
        Arc::new(SyntheticDriverFactory),
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        scenario_repo,
        flow_repo,
        session_repo,
        scenario_service,
    };

    let router = create_router(state);

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "control plane listening");

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("control plane shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install CTRL-C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received CTRL-C signal, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
