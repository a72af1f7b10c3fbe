mod assets;

use crate::state::AppState;
use crate::ws;
use axum::{Router, handler::HandlerWithoutStateExt, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.asset_dir)
        .not_found_service(assets::not_found.into_service());

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Root document, or the relay when the request is an upgrade
        .route("/", get(assets::root))
        // WebSocket endpoint
        .route("/ws", get(ws::handler::ws_handler))
        // Everything else is a static asset
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
