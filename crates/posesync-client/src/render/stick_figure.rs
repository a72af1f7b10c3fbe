use async_trait::async_trait;
use image::Rgba;
use posesync_protocol::{FaceFrame, Pose};

use super::{Illustration, IllustrationFactory, Surface};
use crate::error::ClientError;

const BODY: Rgba<u8> = Rgba([40, 40, 40, 255]);
const JOINT: Rgba<u8> = Rgba([220, 60, 60, 255]);
const FACE: Rgba<u8> = Rgba([60, 90, 220, 255]);

/// Keypoint pairs joined by a bone
const BONES: &[(&str, &str)] = &[
    ("leftShoulder", "rightShoulder"),
    ("leftShoulder", "leftElbow"),
    ("leftElbow", "leftWrist"),
    ("rightShoulder", "rightElbow"),
    ("rightElbow", "rightWrist"),
    ("leftShoulder", "leftHip"),
    ("rightShoulder", "rightHip"),
    ("leftHip", "rightHip"),
    ("leftHip", "leftKnee"),
    ("leftKnee", "leftAnkle"),
    ("rightHip", "rightKnee"),
    ("rightKnee", "rightAnkle"),
];

/// Bones and joints for the body, dots for the face
pub struct StickFigure {
    min_part_confidence: f32,
    pose: Option<Pose>,
    face: Option<FaceFrame>,
}

impl StickFigure {
    pub fn new(min_part_confidence: f32) -> Self {
        Self {
            min_part_confidence,
            pose: None,
            face: None,
        }
    }
}

#[async_trait]
impl Illustration for StickFigure {
    fn update_skeleton(&mut self, pose: &Pose, face: Option<&FaceFrame>) {
        self.pose = Some(pose.clone());
        self.face = face.cloned();
    }

    async fn draw(&mut self, surface: &mut Surface) -> Result<(), ClientError> {
        let Some(pose) = &self.pose else {
            return Ok(());
        };

        let confident = |part: &str| {
            pose.keypoint(part)
                .filter(|k| k.score >= self.min_part_confidence)
                .map(|k| k.position)
        };

        for &(from, to) in BONES {
            if let (Some(a), Some(b)) = (confident(from), confident(to)) {
                surface.draw_line(a, b, BODY);
            }
        }

        for keypoint in &pose.keypoints {
            if keypoint.score >= self.min_part_confidence {
                surface.draw_dot(keypoint.position, 2.0, JOINT);
            }
        }

        if let Some(face) = &self.face {
            for point in face.points.values() {
                surface.draw_dot(*point, 1.0, FACE);
            }
        }

        Ok(())
    }
}

pub struct StickFigureFactory {
    min_part_confidence: f32,
}

impl StickFigureFactory {
    pub fn new(min_part_confidence: f32) -> Self {
        Self {
            min_part_confidence,
        }
    }
}

impl IllustrationFactory for StickFigureFactory {
    fn instantiate(&self) -> Result<Box<dyn Illustration>, ClientError> {
        Ok(Box::new(StickFigure::new(self.min_part_confidence)))
    }
}
