//! Capture → estimate → send.
//!
//! Frame acquisition and pose/face estimation are capabilities supplied
//! from outside; this module only defines their shape and drives them.

pub mod capture_loop;
pub mod replay;
pub mod scheduler;

use async_trait::async_trait;
use posesync_protocol::{FaceFrame, Pose};

use crate::error::ClientError;

pub use capture_loop::{CaptureLoop, CycleOutcome};
pub use scheduler::{FrameScheduler, StopHandle, StopSignal, stop_signal};

/// One acquired camera frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Strictly increasing per source
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGB data
}

/// A camera or anything else that yields frames
#[async_trait]
pub trait FrameSource: Send {
    /// Acquire the device. Called once before joining the relay; an error
    /// here means the session never starts.
    async fn open(&mut self) -> Result<(), ClientError>;

    async fn grab(&mut self) -> Result<Frame, ClientError>;
}

/// Best-effort body pose estimation; empty when nothing is found
#[async_trait]
pub trait PoseEstimator: Send + Sync {
    async fn estimate_poses(&self, frame: &Frame) -> Vec<Pose>;
}

/// Best-effort facial landmark estimation; empty when nothing is found
#[async_trait]
pub trait FaceEstimator: Send + Sync {
    async fn estimate_faces(&self, frame: &Frame) -> Vec<FaceFrame>;
}

/// Pick the best pose and the best face, or nothing if either is missing
pub fn select_sample(
    poses: Vec<Pose>,
    faces: Vec<FaceFrame>,
    min_pose_confidence: f32,
) -> Option<(Pose, FaceFrame)> {
    let pose = poses
        .into_iter()
        .filter(|p| p.score >= min_pose_confidence)
        .max_by(|a, b| a.score.total_cmp(&b.score))?;
    let face = faces
        .into_iter()
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))?;
    Some((pose, face))
}
