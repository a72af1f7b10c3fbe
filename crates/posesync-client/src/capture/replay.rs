//! Replays recorded estimator output in place of a live camera.
//!
//! A recording is JSON lines, one frame per line:
//! `{ "poses": [<Pose>, ...], "faces": [<FaceFrame>, ...] }`.
//! Either list may be missing or empty.

use async_trait::async_trait;
use posesync_protocol::{FaceFrame, Pose};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use super::{FaceEstimator, Frame, FrameSource, PoseEstimator};
use crate::error::ClientError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub poses: Vec<Pose>,
    #[serde(default)]
    pub faces: Vec<FaceFrame>,
}

#[derive(Debug, Clone)]
pub struct ReplayRecording {
    frames: Vec<RecordedFrame>,
}

impl ReplayRecording {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Acquisition(format!("{}: {}", path.display(), e))
        })?;

        let recording = Self::parse(&contents)
            .map_err(|e| ClientError::Acquisition(format!("{}: {}", path.display(), e)))?;
        tracing::info!(
            "Loaded {} recorded frames from {}",
            recording.len(),
            path.display()
        );
        Ok(recording)
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        let frames = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| format!("line {}: {}", index + 1, e))
            })
            .collect::<Result<Vec<RecordedFrame>, _>>()?;

        if frames.is_empty() {
            return Err("recording has no frames".to_string());
        }

        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The recorded output for a frame; playback loops
    fn frame(&self, sequence: u64) -> &RecordedFrame {
        &self.frames[(sequence % self.frames.len() as u64) as usize]
    }
}

/// Emits blank frames with increasing sequence numbers
pub struct ReplayCamera {
    width: u32,
    height: u32,
    next: u64,
}

impl ReplayCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next: 0,
        }
    }

    /// Bytes in one RGB frame
    fn frame_len(&self) -> Result<usize, ClientError> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or_else(|| {
                ClientError::Acquisition(format!(
                    "{}x{} frames do not fit in memory",
                    self.width, self.height
                ))
            })
    }
}

#[async_trait]
impl FrameSource for ReplayCamera {
    async fn open(&mut self) -> Result<(), ClientError> {
        self.frame_len()?;
        Ok(())
    }

    async fn grab(&mut self) -> Result<Frame, ClientError> {
        let len = self.frame_len()?;
        let sequence = self.next;
        self.next += 1;
        Ok(Frame {
            sequence,
            width: self.width,
            height: self.height,
            data: vec![0; len],
        })
    }
}

/// Answers both estimators from a recording, keyed by frame sequence
pub struct ReplayEstimator {
    recording: Arc<ReplayRecording>,
}

impl ReplayEstimator {
    pub fn new(recording: Arc<ReplayRecording>) -> Self {
        Self { recording }
    }
}

#[async_trait]
impl PoseEstimator for ReplayEstimator {
    async fn estimate_poses(&self, frame: &Frame) -> Vec<Pose> {
        self.recording.frame(frame.sequence).poses.clone()
    }
}

#[async_trait]
impl FaceEstimator for ReplayEstimator {
    async fn estimate_faces(&self, frame: &Frame) -> Vec<FaceFrame> {
        self.recording.frame(frame.sequence).faces.clone()
    }
}
