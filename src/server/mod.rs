//! HTTP server for the voxbrief API.
//!
//! Provides REST endpoints for:
//! - Text and voice prompts
//! - Company website analysis and CV summaries
//! - LinkedIn profile extraction
//!
//! Anything else falls through to the static web UI.

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Router with CORS and request tracing applied.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind `0.0.0.0:port` and serve until `shutdown_signal` completes.
///
/// # Errors
/// Returns an error if the port cannot be bound or the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    port: u16,
    shutdown_signal: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, shutdown_signal).await
}

/// Serve on an already bound listener.
///
/// In-flight requests finish before this returns.
///
/// # Errors
/// Returns an error if accepting connections fails.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown_signal: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!(
        "voxbrief server listening on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::*;
    use crate::config::AppConfig;
    use crate::llm::ModelClient;

    #[tokio::test]
    async fn test_serves_health_and_shuts_down() {
        let config = AppConfig::default();
        let client = ModelClient::degraded(config.llm.model.clone());
        let state = Arc::new(AppState::assemble(config, client, None).unwrap());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, state, async {
            let _ = stopped.await;
        }));

        let response = reqwest::Client::new()
            .get(format!("http://{addr}/healthz"))
            .header("Origin", "http://localhost:8080")
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["llm"], false);

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
