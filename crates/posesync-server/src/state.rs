use crate::ws::connections::ConnectionRegistry;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Directory the static asset channel serves from
    pub asset_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let asset_dir = std::env::var("ASSET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                tracing::debug!("ASSET_DIR not set, serving assets from ./static");
                PathBuf::from("static")
            });

        Ok(Config {
            bind_address,
            asset_dir,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub relay: Arc<ConnectionRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            relay: Arc::new(ConnectionRegistry::new()),
        }
    }
}
