//! Drawing surface handles.
//!
//! The host owns the platform drawing target. The core only ever sees a
//! [`SurfaceHandle`]: a stable [`SurfaceId`] plus the surface's current pixel
//! dimensions. A resize keeps the id and changes the size; destroying and
//! re-creating a target yields a new id.
//!
//! ```
//! use surfacing::surface::{SurfaceHandle, SurfaceSize};
//!
//! let mut surface = SurfaceHandle::new(SurfaceSize::new(800, 600));
//! let id = surface.id();
//! surface.resize(SurfaceSize::new(400, 300));
//! assert_eq!(surface.id(), id);
//! assert_eq!(surface.size().to_string(), "400×300");
//! ```

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a host drawing target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SurfaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Size of a surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero. Nothing can be bound to an empty surface.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered by this size.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl Display for SurfaceSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Borrowed view of a host surface: its identity and current dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceHandle {
    id: SurfaceId,
    size: SurfaceSize,
}

impl SurfaceHandle {
    /// Creates a handle for a freshly created host surface.
    pub fn new(size: SurfaceSize) -> Self {
        Self { id: SurfaceId::new(), size }
    }

    /// Creates a handle for a host surface whose identity is already known.
    pub fn with_id(id: SurfaceId, size: SurfaceSize) -> Self {
        Self { id, size }
    }

    #[inline]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    #[inline]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Changes the dimensions, keeping the identity.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }
}

/// Whether a surface currently exists, and if so which one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SurfaceState {
    #[default]
    Absent,
    Present(SurfaceHandle),
}

impl SurfaceState {
    pub fn handle(&self) -> Option<&SurfaceHandle> {
        match self {
            SurfaceState::Absent => None,
            SurfaceState::Present(handle) => Some(handle),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, SurfaceState::Present(_))
    }
}

/// Lifecycle notifications delivered by the host for its drawing target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A surface was created and can be drawn to.
    Available(SurfaceHandle),
    /// The surface with the given identity changed its dimensions.
    Resized { id: SurfaceId, size: SurfaceSize },
    /// The surface with the given identity is going away.
    Destroyed { id: SurfaceId },
}
