use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use posesync_client::capture::replay::{ReplayCamera, ReplayEstimator, ReplayRecording};
use posesync_client::capture::stop_signal;
use posesync_client::render::StickFigureFactory;
use posesync_client::{ClientError, Config, Session};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "posesync=debug,posesync_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    tracing::info!("Starting Posesync client...");

    let config = Config::load()?;

    // Acquisition comes first: without frames there is nothing to share
    let replay_file = config
        .replay_file
        .clone()
        .ok_or_else(|| ClientError::Acquisition("REPLAY_FILE is not set".to_string()))?;
    let recording = Arc::new(ReplayRecording::load(&replay_file)?);
    let camera = ReplayCamera::new(config.video_width, config.video_height);
    let estimator = Arc::new(ReplayEstimator::new(recording));
    let factory = Arc::new(StickFigureFactory::new(config.min_part_confidence));

    let session = Session::start(&config, camera, estimator.clone(), estimator, factory).await?;
    tracing::info!("Joined {} as {}", config.server_url, session.id());

    let (stop, signal) = stop_signal();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
        stop.stop();
    });

    let reconciler = session.run(signal).await?;

    if let Some(dir) = &config.snapshot_dir {
        reconciler.save_surfaces(dir)?;
    }

    tracing::info!("Posesync client stopped");
    Ok(())
}
