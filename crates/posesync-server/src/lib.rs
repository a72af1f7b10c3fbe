//! Posesync relay
//!
//! Assigns each WebSocket connection a participant id, keeps the latest
//! pose sample per participant, and rebroadcasts the full state after
//! every change. Also serves the static client assets.

pub mod api;
pub mod error;
pub mod state;
pub mod store;
pub mod ws;

/// Build the relay router for the given configuration
pub fn create_app(config: state::Config) -> axum::Router {
    let app_state = state::AppState::new(config);
    api::create_router(app_state)
}
