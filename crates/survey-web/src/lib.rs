//! Survey Right Web Server
//!
//! Axum-based REST API plus the live dashboard WebSocket.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod websocket;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Surveys
        .route(
            "/surveys",
            get(routes::surveys::list_surveys).post(routes::surveys::create_survey),
        )
        // GET takes a refid, PUT and DELETE take a survey id.
        .route(
            "/surveys/{key}",
            get(routes::surveys::get_survey)
                .put(routes::surveys::update_survey)
                .delete(routes::surveys::delete_survey),
        )
        // Responses
        .route("/responses", post(routes::responses::create_response))
        .route("/responses/bulk", post(routes::responses::bulk_create_responses))
        .route("/responses/{refid}", get(routes::responses::list_responses))
        // Export
        .route("/export/{refid}", get(routes::export::export_responses))
        // Live viewers
        .route("/live/{refid}", get(routes::live::live_status));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws/dashboard/{refid}", get(websocket::dashboard_ws))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until Ctrl+C.
pub async fn run_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Web server listening on http://{}:{}", config.host, config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
