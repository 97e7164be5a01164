//! HTTP service: upload a PDF, then translate its pages.
//!
//! ## Routes
//!
//! | Method | Path                              | Handler                 |
//! |--------|-----------------------------------|-------------------------|
//! | POST   | `/upload`, `/api/upload`          | [`routes::upload`]      |
//! | POST   | `/translate`, `/api/translate`    | [`routes::translate`]   |
//! | GET    | `/health`                         | [`routes::health`]      |
//!
//! When a static directory is configured, unmatched paths are served from
//! it, so a built frontend can live next to the API.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use crate::config::{ServerConfig, TranslationConfig};
use crate::error::TranslatorError;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(routes::health))
        .route("/upload", post(routes::upload))
        .route("/api/upload", post(routes::upload))
        .route("/translate", post(routes::translate))
        .route("/api/translate", post(routes::translate));

    if let Some(dir) = &state.server.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(state.server.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP service until Ctrl+C.
pub async fn serve(server: ServerConfig, translation: TranslationConfig) -> Result<(), TranslatorError> {
    tokio::fs::create_dir_all(&server.upload_dir)
        .await
        .map_err(|source| TranslatorError::Io {
            path: server.upload_dir.clone(),
            source,
        })?;

    let bind = server.bind;
    info!(
        "Provider {} / model {} (key {})",
        translation.provider,
        translation.model,
        translation.masked_api_key()
    );
    let app = router(AppState::new(server, translation));

    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| TranslatorError::Internal(format!("cannot bind {bind}: {e}")))?;
    info!("Listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TranslatorError::Internal(format!("server error: {e}")))?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No handler could be installed; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
