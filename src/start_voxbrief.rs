//! Startup helpers for the voxbrief server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::server::{self, AppState};

/// Install the global tracing subscriber. `RUST_LOG` refines the default `info` level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

/// Run the server (used by the `voxbrief-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();
    tracing::info!("Starting voxbrief v{}", env!("CARGO_PKG_VERSION"));

    let state = match initialize() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to create state: {e}");
            return ExitCode::from(1);
        }
    };
    let port = state.config.server.port;

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, port, shutdown_signal())) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}

/// Load configuration from the environment and build the application state.
///
/// # Errors
/// Returns an error if the configuration is invalid or a client cannot be built.
pub fn initialize() -> Result<Arc<AppState>, Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        model = %config.llm.model,
        endpoint = %config.llm.endpoint,
        port = config.server.port,
        "configuration loaded"
    );
    if !config.llm.has_credential() {
        tracing::warn!("GROQ_API_KEY is not set, running in degraded mode");
    }
    Ok(AppState::from_config(config)?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
