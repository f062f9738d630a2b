//! CPU rendering into an owned RGBA8 pixel buffer.
//!
//! The buffer always matches the bound surface's dimensions. Each frame fills
//! the whole buffer with a single colour; the host composites it from
//! [`snapshot`](crate::render::BackendInstance::snapshot).

use crate::render::backend::{BackendCapabilities, BackendInstance, PixelFormat, RenderBackend, RgbaImage};
use crate::render::Argb;
use crate::surface::{SurfaceHandle, SurfaceId, SurfaceSize};
use anyhow::{bail, Result};

const BYTES_PER_PIXEL: u64 = 4;

/// Software backend. Refuses surfaces larger than `max_pixels`.
#[derive(Debug)]
pub struct SoftwareBackend {
    max_pixels: u64,
}

impl SoftwareBackend {
    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }

    #[inline]
    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }
}

impl RenderBackend for SoftwareBackend {
    fn name(&self) -> &str {
        "CPU"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::RESIZE_IN_PLACE | BackendCapabilities::PIXEL_ACCESS | BackendCapabilities::PRESENTS
    }

    fn initialize(&self, surface: &SurfaceHandle) -> Result<Box<dyn BackendInstance>> {
        let size = surface.size();
        let buf = allocate(size, self.max_pixels)?;

        Ok(Box::new(SoftwareInstance {
            surface_id: surface.id(),
            size,
            max_pixels: self.max_pixels,
            buf,
            oversized: false,
            frame_id: 0,
        }))
    }
}

fn allocate(size: SurfaceSize, max_pixels: u64) -> Result<Vec<u8>> {
    if size.width.checked_mul(BYTES_PER_PIXEL as u32).is_none() {
        bail!("surface {size} is too wide for a single buffer row");
    }
    if size.area() > max_pixels {
        bail!("surface {size} exceeds the buffer limit of {max_pixels} pixels");
    }
    let Ok(len) = usize::try_from(size.area() * BYTES_PER_PIXEL) else {
        bail!("surface {size} does not fit in addressable memory");
    };
    Ok(vec![0u8; len])
}

pub struct SoftwareInstance {
    surface_id: SurfaceId,
    size: SurfaceSize,
    max_pixels: u64,
    buf: Vec<u8>,
    /// Set when a resize asked for more than `max_pixels`; frames fail until a smaller size arrives.
    oversized: bool,
    frame_id: u64,
}

impl SoftwareInstance {
    fn fill(&mut self, color: Argb) {
        let px = color.to_rgba8();
        for chunk in self.buf.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Cannot overflow: `size` only ever holds sizes `allocate` accepted.
    #[inline]
    fn stride(&self) -> u32 {
        self.size.width * BYTES_PER_PIXEL as u32
    }
}

impl BackendInstance for SoftwareInstance {
    fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        match allocate(size, self.max_pixels) {
            Ok(buf) => {
                self.buf = buf;
                self.size = size;
                self.oversized = false;
            }
            Err(e) => {
                log::warn!(target: "surfacing", "CPU backend keeps its {} buffer: {e}", self.size);
                self.oversized = true;
            }
        }
    }

    fn render_frame(&mut self, color: Argb) -> Result<()> {
        if self.oversized {
            bail!("surface grew beyond the buffer limit of {} pixels", self.max_pixels);
        }
        self.fill(color);
        self.frame_id = self.frame_id.wrapping_add(1);
        Ok(())
    }

    fn teardown(&mut self) {
        self.buf = Vec::new();
    }

    fn frame_id(&self) -> u64 {
        self.frame_id
    }

    fn snapshot(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(
            self.buf.clone(),
            self.size.width,
            self.size.height,
            self.stride(),
            PixelFormat::Rgba8,
        )
    }
}
