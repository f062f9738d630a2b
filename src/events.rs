//! Engine event types and commands.
//!
//! - [`ShellCommand`]: notifications from the presentation shell, sent to a
//!   running [`SurfacingHost`](crate::host::SurfacingHost).
//! - [`EngineEvent`]: notifications emitted by the engine on every binding
//!   transition, draw and status line.

use crate::render::Argb;
use crate::surface::{SurfaceHandle, SurfaceId, SurfaceSize};
use tokio::sync::oneshot;

/// Commands the shell sends to the host loop.
#[derive(Debug)]
pub enum ShellCommand {
    /// A surface was created.
    SurfaceAvailable { surface: SurfaceHandle },
    /// The surface changed dimensions.
    SurfaceResized { id: SurfaceId, size: SurfaceSize },
    /// The surface is being destroyed. `reply` receives the acknowledgement once cleanup finished.
    SurfaceDestroyed { id: SurfaceId, reply: oneshot::Sender<bool> },
    /// The user picked another backend.
    SelectionChanged { index: usize },
    /// The user pressed draw.
    DrawRequested,
    /// Stop the host loop, tearing down any live binding.
    Shutdown,
}

/// Events emitted by the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// A backend instance is live.
    Bound { index: usize, name: String, size: SurfaceSize },
    /// The previous instance was torn down and nothing replaced it.
    Unbound,
    /// Backend construction failed; nothing is bound.
    BindingFailed { index: usize, reason: String },
    /// The bound instance was told about new dimensions.
    Resized { size: SurfaceSize },
    /// A frame was rendered by the bound backend.
    FrameDrawn { index: usize, color: Argb },
    /// A status line was appended to the log sink.
    LogLine(String),
}
