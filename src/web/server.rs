use axum::{routing::get, Router};
use std::io;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::telemetry::{HistoryStore, Poller, PositionFetcher};

use super::api::telemetry as telemetry_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::AppState;
use super::ui::handlers as ui_handlers;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // UI
        .route("/", get(ui_handlers::index))
        // Telemetry
        .route("/latest", get(telemetry_handlers::latest))
        .route("/history", get(telemetry_handlers::history))
        .route("/future", get(telemetry_handlers::future))
        .route("/status", get(telemetry_handlers::status))
        // Static files
        .nest_service("/static", ServeDir::new("static"))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let history = Arc::new(HistoryStore::new(config.telemetry.history_max));
    let fetcher = Arc::new(
        PositionFetcher::new(config.telemetry.fetcher_settings()).map_err(io::Error::other)?,
    );

    // The poller must be sampling before the first request is accepted.
    let mut poller = Poller::start(
        fetcher.clone(),
        history.clone(),
        config.telemetry.poller_settings(),
    );

    let state = AppState {
        config: Arc::new(config),
        history,
        fetcher,
    };
    let app = build_router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if poller.is_running() {
        poller.stop().await;
    }
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
