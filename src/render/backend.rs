use bitflags::bitflags;
use crate::render::Argb;
use crate::surface::{SurfaceHandle, SurfaceId, SurfaceSize};

bitflags! {
    /// What a backend can do beyond the mandatory initialize/render/teardown cycle.
    pub struct BackendCapabilities: u8 {
        /// Keeps its native resources across a resize instead of rebuilding them.
        const RESIZE_IN_PLACE = 0b0001;
        /// Can hand out a CPU copy of the last rendered frame.
        const PIXEL_ACCESS    = 0b0010;
        /// Puts the frame colour on the surface when asked to render.
        const PRESENTS        = 0b0100;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8,
    PreMulArgb32,
}

/// CPU copy of a rendered frame.
#[derive(Clone)]
pub struct RgbaImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: PixelFormat,
}

impl RgbaImage {
    /// Wraps a raw pixel buffer. Returns `None` when the buffer is too small
    /// for `height` rows of `stride` bytes.
    pub fn from_raw(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        stride: u32,
        format: PixelFormat,
    ) -> Option<Self> {
        if pixels.len() < (height as usize) * (stride as usize) {
            return None;
        }

        Some(Self {
            pixels,
            width,
            height,
            stride,
            format,
        })
    }

    /// Returns the four bytes of the pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize) * (self.stride as usize) + (x as usize) * 4;
        let px = self.pixels.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

impl std::fmt::Debug for RgbaImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbaImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("len", &self.pixels.len())
            .finish()
    }
}

/// A registered rendering implementation.
///
/// Backends are stateless factories: everything that lives as long as a
/// binding lives in the [`BackendInstance`] returned by [`initialize`](Self::initialize).
pub trait RenderBackend: Send + Sync {
    /// Human-readable name shown in the selection list.
    fn name(&self) -> &str;

    fn capabilities(&self) -> BackendCapabilities;

    /// Binds a new instance to `surface` at its current size.
    ///
    /// Errors are backend specific (e.g. the surface is too large for the
    /// backend's buffers) and leave nothing behind.
    fn initialize(&self, surface: &SurfaceHandle) -> anyhow::Result<Box<dyn BackendInstance>>;
}

/// The live state of one backend bound to one surface.
///
/// Calls occur with the owning controller's lock held, so implementations
/// never see concurrent calls.
pub trait BackendInstance: Send {
    /// Identity of the surface this instance was initialized against.
    fn surface_id(&self) -> SurfaceId;

    /// Dimensions the instance is currently drawing at.
    fn size(&self) -> SurfaceSize;

    /// Notification that the bound surface changed dimensions. Backends that
    /// cannot resize in place must degrade on their own.
    fn resize(&mut self, size: SurfaceSize);

    /// Draws one frame filled with `color`.
    fn render_frame(&mut self, color: Argb) -> anyhow::Result<()>;

    /// Releases native resources. Called exactly once, right before the instance is dropped.
    fn teardown(&mut self);

    /// Number of frames rendered so far.
    fn frame_id(&self) -> u64;

    /// Copy of the last rendered frame, for backends with [`BackendCapabilities::PIXEL_ACCESS`].
    fn snapshot(&self) -> Option<RgbaImage> {
        None
    }
}
