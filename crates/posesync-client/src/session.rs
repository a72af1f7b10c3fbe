//! One participant's session: relay connection, capture loop, reconciler.

use posesync_protocol::ParticipantId;
use std::sync::Arc;

use crate::capture::{CaptureLoop, FaceEstimator, FrameScheduler, FrameSource, PoseEstimator, StopSignal};
use crate::config::Config;
use crate::error::ClientError;
use crate::network::RelayClient;
use crate::render::{IllustrationFactory, Reconciler};
use crate::state::{ConnectionState, SharedView};

pub struct Session<S> {
    client: Arc<RelayClient>,
    view: SharedView,
    capture: CaptureLoop<S>,
    reconciler: Reconciler,
    refresh_hz: u32,
}

impl<S: FrameSource> Session<S> {
    /// Open the frame source, connect to the relay and assemble the session.
    ///
    /// Fails without touching the relay if the source cannot be opened, and
    /// fails if the relay cannot be reached or does not assign an id.
    pub async fn start(
        config: &Config,
        mut source: S,
        poses: Arc<dyn PoseEstimator>,
        faces: Arc<dyn FaceEstimator>,
        factory: Arc<dyn IllustrationFactory>,
    ) -> Result<Self, ClientError> {
        source.open().await?;

        let view = SharedView::new();
        let client = Arc::new(RelayClient::connect(&config.server_url, view.clone()).await?);
        let self_id = client.id().clone();

        let capture = CaptureLoop::new(
            source,
            poses,
            faces,
            client.clone(),
            view.clone(),
            self_id,
            config.min_pose_confidence,
        );

        Ok(Self {
            client,
            view,
            capture,
            reconciler: Reconciler::new(factory, config),
            refresh_hz: config.refresh_hz,
        })
    }

    pub fn id(&self) -> &ParticipantId {
        self.client.id()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.client.state()
    }

    pub fn view(&self) -> &SharedView {
        &self.view
    }

    /// Run until `stop` fires or acquisition fails.
    ///
    /// The capture loop and the reconciler share one task, so they only
    /// interleave at await points. Hands back the reconciler so the caller
    /// can inspect or save the final figures.
    pub async fn run(self, stop: StopSignal) -> Result<Reconciler, ClientError> {
        let Session {
            view,
            mut capture,
            mut reconciler,
            refresh_hz,
            ..
        } = self;

        let scheduler = FrameScheduler::new(refresh_hz, stop.clone());
        tokio::try_join!(
            capture.run(scheduler),
            reconcile(&view, &mut reconciler, stop)
        )?;

        Ok(reconciler)
    }
}

async fn reconcile(
    view: &SharedView,
    reconciler: &mut Reconciler,
    mut stop: StopSignal,
) -> Result<(), ClientError> {
    let mut changes = view.subscribe();

    loop {
        tokio::select! {
            biased;
            _ = stop.stopped() => return Ok(()),
            changed = changes.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
        }

        let landmarks = view.snapshot().await;
        let report = reconciler.apply(&landmarks).await;
        if report.created > 0 || report.destroyed > 0 {
            tracing::info!(
                "Figures: {} on screen (+{} -{})",
                reconciler.len(),
                report.created,
                report.destroyed
            );
        }
    }
}
