use anyhow::{anyhow, bail, Result};
use crate::render::backend::{BackendCapabilities, BackendInstance, PixelFormat, RenderBackend, RgbaImage};
use crate::render::Argb;
use crate::surface::{SurfaceHandle, SurfaceId, SurfaceSize};

/// Largest width or height cairo accepts for an image surface.
const MAX_DIMENSION: u32 = 32767;

/// Cairo backend for rendering using the cairo graphics library.
///
/// Cairo surfaces are not `Send`, so an instance only keeps the finished
/// frame. Every render paints into a short-lived image surface and copies the
/// pixels out.
#[derive(Debug)]
pub struct CairoBackend {
    max_pixels: u64,
}

impl CairoBackend {
    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }
}

impl RenderBackend for CairoBackend {
    fn name(&self) -> &str {
        "Cairo"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::PIXEL_ACCESS | BackendCapabilities::PRESENTS
    }

    /// Checks that cairo accepts an ARGB32 image of the surface's size.
    fn initialize(&self, surface: &SurfaceHandle) -> Result<Box<dyn BackendInstance>> {
        let size = surface.size();
        let stride = stride_for(size, self.max_pixels)?;

        Ok(Box::new(CairoInstance {
            surface_id: surface.id(),
            size,
            stride,
            max_pixels: self.max_pixels,
            frame: vec![0u8; (size.height as usize) * (stride as usize)],
            oversized: false,
            frame_id: 0,
        }))
    }
}

fn stride_for(size: SurfaceSize, max_pixels: u64) -> Result<u32> {
    if size.width > MAX_DIMENSION || size.height > MAX_DIMENSION {
        bail!("surface {size} is too large for cairo (max {MAX_DIMENSION} per side)");
    }
    if size.area() > max_pixels {
        bail!("surface {size} exceeds the buffer limit of {max_pixels} pixels");
    }
    let stride = cairo::Format::ARgb32
        .stride_for_width(size.width)
        .map_err(|e| anyhow!("cairo rejected width {}: {e}", size.width))?;
    Ok(stride as u32)
}

pub struct CairoInstance {
    surface_id: SurfaceId,
    size: SurfaceSize,
    stride: u32,
    max_pixels: u64,
    /// Last painted frame, premultiplied ARGB32 in native byte order.
    frame: Vec<u8>,
    /// Set when a resize was refused; frames fail until an acceptable size arrives.
    oversized: bool,
    frame_id: u64,
}

impl CairoInstance {
    fn paint(&mut self, color: Argb) -> Result<()> {
        let surface = cairo::ImageSurface::create(
            cairo::Format::ARgb32,
            self.size.width as i32,
            self.size.height as i32,
        )?;

        {
            let cr = cairo::Context::new(&surface)?;
            let (r, g, b, a) = color.to_unit_rgba();
            cr.set_operator(cairo::Operator::Source);
            cr.set_source_rgba(r, g, b, a);
            cr.paint()?;
        }
        surface.flush();

        self.stride = surface.stride() as u32;
        let frame = &mut self.frame;
        surface
            .with_data(|data| {
                frame.clear();
                frame.extend_from_slice(data);
            })
            .map_err(|e| anyhow!("cannot read cairo surface: {e}"))?;
        Ok(())
    }
}

impl BackendInstance for CairoInstance {
    fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    /// The image surface is rebuilt per frame anyway; only the stored frame is reshaped.
    fn resize(&mut self, size: SurfaceSize) {
        match stride_for(size, self.max_pixels) {
            Ok(stride) => {
                self.size = size;
                self.stride = stride;
                self.frame = vec![0u8; (size.height as usize) * (stride as usize)];
                self.oversized = false;
            }
            Err(e) => {
                log::warn!(target: "surfacing", "Cairo backend keeps its {} frame: {e}", self.size);
                self.oversized = true;
            }
        }
    }

    fn render_frame(&mut self, color: Argb) -> Result<()> {
        if self.oversized {
            bail!("surface grew beyond what cairo can paint");
        }
        self.paint(color)?;
        self.frame_id = self.frame_id.wrapping_add(1);
        Ok(())
    }

    fn teardown(&mut self) {
        self.frame = Vec::new();
    }

    fn frame_id(&self) -> u64 {
        self.frame_id
    }

    fn snapshot(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(
            self.frame.clone(),
            self.size.width,
            self.size.height,
            self.stride,
            PixelFormat::PreMulArgb32,
        )
    }
}
