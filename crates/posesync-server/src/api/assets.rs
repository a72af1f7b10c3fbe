use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::ws;
use axum::{
    extract::{State, WebSocketUpgrade, ws::rejection::WebSocketUpgradeRejection},
    response::{Html, IntoResponse, Response},
};

const NOT_FOUND: &str = "File not found";

/// `GET /`: clients open their relay connection on the same URL the page
/// was loaded from, so an upgrade request here goes to the relay.
pub async fn root(
    upgrade: std::result::Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Response {
    match upgrade {
        Ok(ws) => ws::handler::upgrade(ws, state),
        Err(_) => index(&state).await.into_response(),
    }
}

async fn index(state: &AppState) -> Result<Html<Vec<u8>>> {
    let path = state.config.asset_dir.join("index.html");
    match tokio::fs::read(&path).await {
        Ok(body) => Ok(Html(body)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound(NOT_FOUND.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND.to_string())
}
