use crate::render::backend::{BackendCapabilities, BackendInstance, RenderBackend};
use crate::render::Argb;
use crate::surface::{SurfaceHandle, SurfaceId, SurfaceSize};
use anyhow::Result;

/// Backend that binds to a surface but never draws anything. It does not
/// advertise [`BackendCapabilities::PRESENTS`], so draws are skipped before
/// they reach it.
#[derive(Debug, Default)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RenderBackend for NullBackend {
    fn name(&self) -> &str {
        "None"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::RESIZE_IN_PLACE
    }

    fn initialize(&self, surface: &SurfaceHandle) -> Result<Box<dyn BackendInstance>> {
        Ok(Box::new(NullInstance {
            surface_id: surface.id(),
            size: surface.size(),
            frame_id: 0,
        }))
    }
}

pub struct NullInstance {
    surface_id: SurfaceId,
    size: SurfaceSize,
    frame_id: u64,
}

impl BackendInstance for NullInstance {
    fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn render_frame(&mut self, _color: Argb) -> Result<()> {
        self.frame_id = self.frame_id.wrapping_add(1);
        Ok(())
    }

    fn teardown(&mut self) {}

    fn frame_id(&self) -> u64 {
        self.frame_id
    }
}
