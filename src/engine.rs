//! The surfacing engine.
//!
//! [`SurfacingEngine`] is what the presentation shell talks to. It exposes one
//! method per shell notification and keeps the [`BindingController`] (which
//! also owns the draw dispatcher) behind a single mutex, so a draw arriving on
//! one thread can never observe a half torn-down binding from another.
//!
//! ```
//! use surfacing::engine::SurfacingEngine;
//! use surfacing::surface::{SurfaceHandle, SurfaceSize};
//!
//! let engine = SurfacingEngine::new(None);
//! let surface = SurfaceHandle::new(SurfaceSize::new(800, 600));
//!
//! engine.on_selection_changed(1);
//! engine.on_surface_available(surface);
//! assert!(engine.on_draw_requested().is_drawn());
//! assert!(engine.on_surface_destroyed(surface.id()));
//! assert!(!engine.on_draw_requested().is_drawn());
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use crate::binding::{BindingController, Selection};
use crate::config::SurfacingConfig;
use crate::dispatch::DrawOutcome;
use crate::events::EngineEvent;
use crate::log_sink::{LogHistory, LogSink, SharedLogHistory, StatusReporter};
use crate::registry::{BackendDescriptor, BackendRegistry};
use crate::render::RgbaImage;
use crate::surface::{SurfaceEvent, SurfaceHandle, SurfaceId, SurfaceSize};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// Thread-safe facade over the binding controller. Cloning yields another
/// handle to the same engine.
#[derive(Clone)]
pub struct SurfacingEngine {
    controller: Arc<Mutex<BindingController>>,
    /// Present when the engine keeps its own rolling history.
    history: Option<SharedLogHistory>,
    event_tx: broadcast::Sender<EngineEvent>,
}

impl std::fmt::Debug for SurfacingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfacingEngine")
            .field("controller", &"Arc<Mutex<BindingController>>")
            .field("history", &self.history)
            .finish()
    }
}

impl SurfacingEngine {
    /// Creates an engine with the default backends.
    ///
    /// If `config` is `None`, [`SurfacingConfig::default`] is used.
    pub fn new(config: Option<SurfacingConfig>) -> Self {
        let config = config.unwrap_or_default();
        let registry = BackendRegistry::with_defaults(&config);
        Self::with_registry(config, registry)
    }

    /// Creates an engine over a custom set of backends, keeping status lines
    /// in an internal [`LogHistory`].
    pub fn with_registry(config: SurfacingConfig, registry: BackendRegistry) -> Self {
        let history = SharedLogHistory::new(config.log_capacity);
        let mut engine = Self::with_sink(config, registry, Arc::new(history.clone()));
        engine.history = Some(history);
        engine
    }

    /// Creates an engine that pushes status lines into a sink owned by the shell.
    pub fn with_sink(config: SurfacingConfig, registry: BackendRegistry, sink: Arc<dyn LogSink>) -> Self {
        let (event_tx, _first_rx) = broadcast::channel::<EngineEvent>(DEFAULT_CHANNEL_CAPACITY);
        let reporter = StatusReporter::new(sink, config.mirror_to_log, Some(event_tx.clone()));
        let controller = BindingController::new(registry, reporter, config.default_selection);

        Self {
            controller: Arc::new(Mutex::new(controller)),
            history: None,
            event_tx,
        }
    }

    /// Locks the controller. A panic inside a backend poisons the lock; the
    /// state it guards is still consistent, so the poison is ignored.
    fn lock(&self) -> MutexGuard<'_, BindingController> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Backends available for selection, in index order.
    pub fn descriptors(&self) -> Vec<BackendDescriptor> {
        self.lock().registry().descriptors().to_vec()
    }

    /// Applies any surface lifecycle notification.
    pub fn handle_surface_event(&self, event: SurfaceEvent) -> bool {
        self.lock().handle_surface_event(event)
    }

    pub fn on_surface_available(&self, surface: SurfaceHandle) {
        self.handle_surface_event(SurfaceEvent::Available(surface));
    }

    pub fn on_surface_resized(&self, id: SurfaceId, width: u32, height: u32) {
        self.handle_surface_event(SurfaceEvent::Resized { id, size: SurfaceSize::new(width, height) });
    }

    /// Tears down whatever is bound to the surface. Always acknowledges with `true`.
    pub fn on_surface_destroyed(&self, id: SurfaceId) -> bool {
        self.handle_surface_event(SurfaceEvent::Destroyed { id })
    }

    /// The surface the engine currently tracks, if any.
    pub fn current_surface(&self) -> Option<SurfaceHandle> {
        self.lock().surface().handle().copied()
    }

    /// Resizes whichever surface is current, under the same lock as draws.
    /// Returns `false` when there is no surface.
    pub fn resize_current_surface(&self, width: u32, height: u32) -> bool {
        let mut controller = self.lock();
        let Some(id) = controller.surface().handle().map(|s| s.id()) else {
            log::debug!(target: "surfacing", "resize to {width}×{height} with no surface, ignored");
            return false;
        };
        controller.handle_surface_event(SurfaceEvent::Resized { id, size: SurfaceSize::new(width, height) })
    }

    /// Destroys whichever surface is current. Acknowledges with `true` even
    /// when there was none.
    pub fn destroy_current_surface(&self) -> bool {
        let mut controller = self.lock();
        match controller.surface().handle().map(|s| s.id()) {
            Some(id) => controller.handle_surface_event(SurfaceEvent::Destroyed { id }),
            None => true,
        }
    }

    pub fn on_selection_changed(&self, index: usize) {
        self.lock().select(index);
    }

    pub fn on_draw_requested(&self) -> DrawOutcome {
        self.lock().draw_frame()
    }

    pub fn selection(&self) -> Selection {
        self.lock().selection()
    }

    /// Index of the bound backend, if any.
    pub fn bound_backend(&self) -> Option<usize> {
        self.lock().binding().active().map(|a| a.index())
    }

    pub fn is_bound(&self) -> bool {
        self.lock().binding().is_bound()
    }

    /// Copy of the last rendered frame, when the bound backend supports it.
    pub fn snapshot(&self) -> Option<RgbaImage> {
        self.lock().snapshot()
    }

    /// Internal log history, or `None` for engines built [`with_sink`](Self::with_sink).
    pub fn log_history(&self) -> Option<LogHistory> {
        self.history.as_ref().map(SharedLogHistory::snapshot)
    }

    /// Tears down any live binding.
    pub fn shutdown(&self) {
        self.lock().shutdown();
    }
}
