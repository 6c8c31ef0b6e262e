use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Gatepass endpoints.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = if config.allow_any_origin {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/", get(handler::root_handler))
        .route("/v1/health", get(handler::health_handler))
        .route("/order", post(handler::order_handler))
        .route("/scan", post(handler::scan_handler))
        .route("/verify", post(handler::verify_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
