use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::error::ProtocolError;

/// Identifier the relay hands out for the lifetime of one connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Generate a fresh opaque identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ProtocolError::EmptyId);
        }
        Ok(Self(value))
    }
}

impl TryFrom<&str> for ParticipantId {
    type Error = ProtocolError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One participant's pose and face estimate at one instant.
///
/// The relay treats both halves as opaque JSON and only checks that each
/// is an object or `null` (no confident estimate). A new sample always
/// replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSample")]
pub struct Sample {
    pose: Value,
    face: Value,
}

/// Unchecked wire shape of a [`Sample`]
#[derive(Debug, Deserialize)]
pub struct RawSample {
    pub pose: Value,
    pub face: Value,
}

impl TryFrom<RawSample> for Sample {
    type Error = ProtocolError;

    fn try_from(raw: RawSample) -> Result<Self, Self::Error> {
        Self::new(raw.pose, raw.face)
    }
}

impl Sample {
    pub fn new(pose: Value, face: Value) -> Result<Self, ProtocolError> {
        check_estimate("pose", &pose)?;
        check_estimate("face", &face)?;
        Ok(Self { pose, face })
    }

    /// Build a sample from typed estimates
    pub fn from_estimates(pose: &Pose, face: &FaceFrame) -> Result<Self, ProtocolError> {
        Ok(Self {
            pose: serde_json::to_value(pose)?,
            face: serde_json::to_value(face)?,
        })
    }

    pub fn pose(&self) -> &Value {
        &self.pose
    }

    pub fn face(&self) -> &Value {
        &self.face
    }

    /// Decode the pose half, `None` if it is empty or not a pose
    pub fn pose_estimate(&self) -> Option<Pose> {
        if self.pose.is_null() {
            return None;
        }
        Pose::deserialize(&self.pose).ok()
    }

    /// Decode the face half, `None` if it is empty or not a face frame
    pub fn face_estimate(&self) -> Option<FaceFrame> {
        if self.face.is_null() {
            return None;
        }
        FaceFrame::deserialize(&self.face).ok()
    }
}

fn check_estimate(field: &'static str, value: &Value) -> Result<(), ProtocolError> {
    match value {
        Value::Object(_) | Value::Null => Ok(()),
        _ => Err(ProtocolError::InvalidField {
            field,
            reason: "expected an object or null",
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A single named body keypoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub part: String,
    pub score: f32,
    pub position: Point,
}

/// Whole-body pose estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub score: f32,
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn keypoint(&self, part: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|k| k.part == part)
    }
}

/// Facial landmark estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceFrame {
    pub confidence: f32,
    pub points: BTreeMap<String, Point>,
}
