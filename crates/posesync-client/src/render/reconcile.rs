//! Keeps one render resource per participant in the shared state

use futures_util::future::join_all;
use posesync_protocol::{KeyedTable, Landmarks, ParticipantId, Sample};
use std::path::Path;
use std::sync::Arc;

use super::{Illustration, IllustrationFactory, Surface};
use crate::config::Config;
use crate::error::ClientError;

/// An illustration and the surface it draws on, owned by one participant
pub struct RenderResource {
    illustration: Box<dyn Illustration>,
    surface: Surface,
}

impl RenderResource {
    /// Draw `sample` from scratch. Returns `false` when the sample has no
    /// pose this client can read, leaving the surface blank.
    async fn render(&mut self, sample: &Sample) -> Result<bool, ClientError> {
        self.surface.clear();

        let Some(pose) = sample.pose_estimate() else {
            return Ok(false);
        };
        let face = sample.face_estimate();

        self.illustration.update_skeleton(&pose, face.as_ref());
        self.illustration.draw(&mut self.surface).await?;
        Ok(true)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }
}

/// Counts from one [`Reconciler::apply`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub destroyed: usize,
    pub drawn: usize,
}

pub struct Reconciler {
    factory: Arc<dyn IllustrationFactory>,
    resources: KeyedTable<RenderResource>,
    canvas_size: (u32, u32),
    capture_size: (u32, u32),
}

impl Reconciler {
    pub fn new(factory: Arc<dyn IllustrationFactory>, config: &Config) -> Self {
        Self {
            factory,
            resources: KeyedTable::new(),
            canvas_size: (config.canvas_width, config.canvas_height),
            capture_size: (config.video_width, config.video_height),
        }
    }

    /// Bring resources in line with `landmarks` and draw every participant.
    ///
    /// Returns once all draws have finished, so a later call never
    /// destroys a resource that is still being drawn.
    pub async fn apply(&mut self, landmarks: &Landmarks) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for id in landmarks.ids() {
            if self.resources.contains(id) {
                continue;
            }
            match self.create_resource() {
                Ok(resource) => {
                    tracing::debug!("Creating figure for {}", id);
                    self.resources.create(id.clone(), resource);
                    report.created += 1;
                }
                Err(e) => tracing::warn!("Failed to create figure for {}: {}", id, e),
            }
        }

        let departed: Vec<ParticipantId> = self
            .resources
            .ids()
            .filter(|id| !landmarks.contains(id))
            .cloned()
            .collect();
        for id in departed {
            if self.resources.destroy(&id).is_some() {
                tracing::debug!("Destroyed figure for {}", id);
                report.destroyed += 1;
            }
        }

        let draws = self.resources.iter_mut().filter_map(|(id, resource)| {
            landmarks
                .get(id)
                .map(|sample| async move { (id, resource.render(sample).await) })
        });
        for (id, result) in join_all(draws).await {
            match result {
                Ok(true) => report.drawn += 1,
                Ok(false) => tracing::trace!("No readable pose for {}", id),
                Err(e) => tracing::warn!("Failed to draw {}: {}", id, e),
            }
        }

        report
    }

    fn create_resource(&self) -> Result<RenderResource, ClientError> {
        let (canvas_width, canvas_height) = self.canvas_size;
        let (capture_width, capture_height) = self.capture_size;
        Ok(RenderResource {
            illustration: self.factory.instantiate()?,
            surface: Surface::new(canvas_width, canvas_height, capture_width, capture_height),
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.resources.ids()
    }

    pub fn resource(&self, id: &ParticipantId) -> Option<&RenderResource> {
        self.resources.get(id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Write every surface to `<dir>/<participant>.png`
    pub fn save_surfaces<P: AsRef<Path>>(&self, dir: P) -> Result<usize, ClientError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        for (id, resource) in &self.resources {
            resource.surface.save(dir.join(format!("{}.png", id)))?;
        }
        tracing::info!("Saved {} figures to {}", self.resources.len(), dir.display());
        Ok(self.resources.len())
    }
}
