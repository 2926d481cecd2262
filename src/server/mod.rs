pub mod error;
pub mod routes;
pub mod state;

use std::path::Path;

use axum::Router;
use axum::routing::{any, get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Config;
pub use state::AppState;

/// Build the axum Router with all API routes, the static UI fallback and middleware.
pub fn build_router(state: AppState) -> Router {
    let static_dir = Path::new(&state.config.static_dir);
    let frontend = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(routes::index))
        .route("/api/health", get(routes::health))
        .route("/api/slack/webhook", post(routes::slack_webhook))
        .route("/api/test/query", post(routes::test_query))
        .route("/api/sprint/summary", get(routes::sprint_summary))
        .route("/api/sprint/notify", post(routes::sprint_notify))
        .route("/api/test/integration", post(routes::test_integration))
        .route("/api/config/status", get(routes::config_status))
        .route("/api/demo/query", post(routes::demo_query))
        .route("/api/{*path}", any(routes::not_found))
        .fallback_service(frontend)
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C / SIGTERM.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let port = config.port;
    let state = AppState::from_config(config);

    if state.config.is_development() {
        let agent = state.agent.clone();
        tokio::spawn(async move {
            tracing::info!("Running integration test on startup");
            match agent.test_integration().await {
                Ok(check) => tracing::info!(sprint = %check.sprint, "Integration test passed on startup"),
                Err(e) => tracing::warn!(error = %e, "Integration test failed on startup"),
            }
        });
    }

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!("Server running on http://localhost:{port}");
    tracing::info!("Slack webhook: http://localhost:{port}/api/slack/webhook");
    tracing::info!("Test endpoint: http://localhost:{port}/api/test/query");
    tracing::info!("Sprint summary: http://localhost:{port}/api/sprint/summary");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutting down gracefully");
}
