use posesync_protocol::{ParticipantId, Sample};
use std::sync::Arc;

use super::{FaceEstimator, FrameScheduler, FrameSource, PoseEstimator, select_sample};
use crate::error::ClientError;
use crate::network::SampleSink;
use crate::state::SharedView;

/// What a single cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A sample was produced, sent, and echoed locally
    Sent,
    /// No usable pose or face this frame
    Skipped,
}

/// Drives the local participant's contribution to the shared state
pub struct CaptureLoop<S> {
    source: S,
    poses: Arc<dyn PoseEstimator>,
    faces: Arc<dyn FaceEstimator>,
    sink: Arc<dyn SampleSink>,
    view: SharedView,
    self_id: ParticipantId,
    min_pose_confidence: f32,
}

impl<S: FrameSource> CaptureLoop<S> {
    pub fn new(
        source: S,
        poses: Arc<dyn PoseEstimator>,
        faces: Arc<dyn FaceEstimator>,
        sink: Arc<dyn SampleSink>,
        view: SharedView,
        self_id: ParticipantId,
        min_pose_confidence: f32,
    ) -> Self {
        Self {
            source,
            poses,
            faces,
            sink,
            view,
            self_id,
            min_pose_confidence,
        }
    }

    /// Run cycles until the scheduler says stop.
    ///
    /// Only an acquisition failure ends the loop early.
    pub async fn run(&mut self, mut scheduler: FrameScheduler) -> Result<(), ClientError> {
        let mut sent = 0u64;
        let mut skipped = 0u64;

        while scheduler.next_cycle().await {
            match self.cycle().await? {
                CycleOutcome::Sent => sent += 1,
                CycleOutcome::Skipped => skipped += 1,
            }
        }

        tracing::info!(
            "Capture loop stopped after {} samples ({} frames without a usable estimate)",
            sent,
            skipped
        );
        Ok(())
    }

    pub async fn cycle(&mut self) -> Result<CycleOutcome, ClientError> {
        let frame = self.source.grab().await?;

        let (poses, faces) = tokio::join!(
            self.poses.estimate_poses(&frame),
            self.faces.estimate_faces(&frame)
        );

        let Some((pose, face)) = select_sample(poses, faces, self.min_pose_confidence) else {
            tracing::trace!("No usable estimate for frame {}", frame.sequence);
            return Ok(CycleOutcome::Skipped);
        };

        let sample = match Sample::from_estimates(&pose, &face) {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!("Failed to encode estimate for frame {}: {}", frame.sequence, e);
                return Ok(CycleOutcome::Skipped);
            }
        };

        match self.sink.send_sample(&sample) {
            Ok(()) => {}
            Err(ClientError::Closed) => {
                tracing::trace!("Relay connection closed, sample stays local");
            }
            Err(e) => tracing::warn!("Failed to send sample: {}", e),
        }

        self.view.echo(self.self_id.clone(), sample).await;

        Ok(CycleOutcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Frame, stop_signal};
    use async_trait::async_trait;
    use posesync_protocol::{FaceFrame, Keypoint, Point, Pose};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct CountingCamera {
        next: u64,
        fail_at: Option<u64>,
    }

    #[async_trait]
    impl FrameSource for CountingCamera {
        async fn open(&mut self) -> Result<(), ClientError> {
            Ok(())
        }

        async fn grab(&mut self) -> Result<Frame, ClientError> {
            if Some(self.next) == self.fail_at {
                return Err(ClientError::Acquisition("unplugged".to_string()));
            }
            self.next += 1;
            Ok(Frame {
                sequence: self.next,
                width: 4,
                height: 4,
                data: vec![0; 48],
            })
        }
    }

    /// Finds a pose on even frames only
    struct EvenFrames;

    #[async_trait]
    impl PoseEstimator for EvenFrames {
        async fn estimate_poses(&self, frame: &Frame) -> Vec<Pose> {
            if frame.sequence % 2 == 0 {
                vec![Pose {
                    score: 0.9,
                    keypoints: vec![Keypoint {
                        part: "nose".to_string(),
                        score: 0.9,
                        position: Point { x: frame.sequence as f32, y: 0.0 },
                    }],
                }]
            } else {
                vec![]
            }
        }
    }

    #[async_trait]
    impl FaceEstimator for EvenFrames {
        async fn estimate_faces(&self, _frame: &Frame) -> Vec<FaceFrame> {
            vec![FaceFrame {
                confidence: 0.8,
                points: BTreeMap::new(),
            }]
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<Sample>>,
    }

    impl SampleSink for RecordingSink {
        fn send_sample(&self, sample: &Sample) -> Result<(), ClientError> {
            self.sent.lock().unwrap().push(sample.clone());
            Ok(())
        }
    }

    struct ClosedSink;

    impl SampleSink for ClosedSink {
        fn send_sample(&self, _sample: &Sample) -> Result<(), ClientError> {
            Err(ClientError::Closed)
        }
    }

    fn me() -> ParticipantId {
        ParticipantId::try_from("me").unwrap()
    }

    fn capture_loop(
        camera: CountingCamera,
        sink: Arc<dyn SampleSink>,
        view: SharedView,
    ) -> CaptureLoop<CountingCamera> {
        let estimator = Arc::new(EvenFrames);
        CaptureLoop::new(camera, estimator.clone(), estimator, sink, view, me(), 0.15)
    }

    #[tokio::test]
    async fn test_sends_and_echoes_only_usable_frames() {
        let sink = Arc::new(RecordingSink::default());
        let view = SharedView::new();
        let mut capture = capture_loop(
            CountingCamera { next: 0, fail_at: None },
            sink.clone(),
            view.clone(),
        );

        assert_eq!(capture.cycle().await.unwrap(), CycleOutcome::Skipped);
        assert!(view.snapshot().await.is_empty());

        assert_eq!(capture.cycle().await.unwrap(), CycleOutcome::Sent);
        let sent = sink.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(view.snapshot().await.get(&me()), Some(&sent[0]));
    }

    #[tokio::test]
    async fn test_skipped_frame_keeps_previous_entry() {
        let sink = Arc::new(RecordingSink::default());
        let view = SharedView::new();
        let mut capture = capture_loop(
            CountingCamera { next: 1, fail_at: None },
            sink.clone(),
            view.clone(),
        );

        assert_eq!(capture.cycle().await.unwrap(), CycleOutcome::Sent);
        let before = view.snapshot().await;
        assert_eq!(capture.cycle().await.unwrap(), CycleOutcome::Skipped);
        assert_eq!(view.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_closed_relay_still_echoes() {
        let view = SharedView::new();
        let mut capture = capture_loop(
            CountingCamera { next: 1, fail_at: None },
            Arc::new(ClosedSink),
            view.clone(),
        );

        assert_eq!(capture.cycle().await.unwrap(), CycleOutcome::Sent);
        assert!(view.snapshot().await.contains(&me()));
    }

    #[tokio::test]
    async fn test_acquisition_failure_ends_the_loop() {
        let (_handle, signal) = stop_signal();
        let mut capture = capture_loop(
            CountingCamera { next: 0, fail_at: Some(3) },
            Arc::new(RecordingSink::default()),
            SharedView::new(),
        );

        let result = capture.run(FrameScheduler::new(1000, signal)).await;
        assert!(matches!(result, Err(ClientError::Acquisition(_))));
    }

    #[tokio::test]
    async fn test_stop_ends_the_loop() {
        let (handle, signal) = stop_signal();
        let sink = Arc::new(RecordingSink::default());
        let mut capture = capture_loop(
            CountingCamera { next: 0, fail_at: None },
            sink.clone(),
            SharedView::new(),
        );

        handle.stop();
        capture.run(FrameScheduler::new(1000, signal)).await.unwrap();
        assert!(sink.sent.lock().unwrap().is_empty());
    }
}
