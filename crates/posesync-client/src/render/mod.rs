//! Per-participant drawing.
//!
//! The illustration engine is a capability: anything implementing
//! [`Illustration`] can be driven by the [`Reconciler`].

pub mod reconcile;
pub mod stick_figure;
pub mod surface;

use async_trait::async_trait;
use posesync_protocol::{FaceFrame, Pose};

use crate::error::ClientError;

pub use reconcile::{ReconcileReport, Reconciler};
pub use stick_figure::{StickFigure, StickFigureFactory};
pub use surface::Surface;

/// A figure that can be posed and drawn
#[async_trait]
pub trait Illustration: Send {
    fn update_skeleton(&mut self, pose: &Pose, face: Option<&FaceFrame>);

    /// Draw the current skeleton; resolves once drawing is complete
    async fn draw(&mut self, surface: &mut Surface) -> Result<(), ClientError>;
}

/// Creates illustrations bound to a fixed base figure
pub trait IllustrationFactory: Send + Sync {
    fn instantiate(&self) -> Result<Box<dyn Illustration>, ClientError>;
}
