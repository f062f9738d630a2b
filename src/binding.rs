//! Binding controller.
//!
//! Tracks the current surface, the current backend selection and the single
//! live [`BackendInstance`], and moves between two states:
//!
//! - [`Binding::Unbound`]: no surface, or nothing could be constructed.
//! - [`Binding::Bound`]: one instance is live for one surface.
//!
//! Every surface creation, selection change and surface destruction goes
//! through [`BindingController::rebind`], which always tears the previous
//! instance down before anything else happens. Resizes are the exception:
//! they are forwarded to the live instance in place.

use crate::dispatch::{DrawDispatcher, DrawOutcome};
use crate::errors::SurfacingError;
use crate::events::EngineEvent;
use crate::log_sink::StatusReporter;
use crate::registry::BackendRegistry;
use crate::render::{BackendCapabilities, BackendInstance, RgbaImage};
use crate::surface::{SurfaceEvent, SurfaceHandle, SurfaceId, SurfaceSize, SurfaceState};

/// Backend index chosen by the user. Always in range for the registry it was clamped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub backend_index: usize,
}

/// A live backend instance and what it was bound against.
pub struct ActiveBinding {
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) capabilities: BackendCapabilities,
    pub(crate) surface: SurfaceHandle,
    pub(crate) instance: Box<dyn BackendInstance>,
}

impl ActiveBinding {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surface(&self) -> &SurfaceHandle {
        &self.surface
    }

    pub fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }

    pub fn frame_id(&self) -> u64 {
        self.instance.frame_id()
    }

    fn teardown(mut self) {
        log::debug!(target: "surfacing", "tearing down {} bound to {}", self.name, self.surface.id());
        self.instance.teardown();
    }
}

impl std::fmt::Debug for ActiveBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveBinding")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("surface", &self.surface)
            .field("frame_id", &self.instance.frame_id())
            .finish()
    }
}

#[derive(Debug, Default)]
pub enum Binding {
    #[default]
    Unbound,
    Bound(ActiveBinding),
}

impl Binding {
    pub fn is_bound(&self) -> bool {
        matches!(self, Binding::Bound(_))
    }

    pub fn active(&self) -> Option<&ActiveBinding> {
        match self {
            Binding::Unbound => None,
            Binding::Bound(active) => Some(active),
        }
    }
}

/// Owns the surface state, the selection and the one live backend instance.
///
/// Not thread safe on its own; [`SurfacingEngine`](crate::engine::SurfacingEngine)
/// wraps it in a mutex together with the draw dispatcher.
pub struct BindingController {
    registry: BackendRegistry,
    surface: SurfaceState,
    selection: Selection,
    binding: Binding,
    dispatcher: DrawDispatcher,
    reporter: StatusReporter,
}

impl BindingController {
    pub(crate) fn new(registry: BackendRegistry, reporter: StatusReporter, initial_selection: usize) -> Self {
        let selection = Selection { backend_index: registry.clamp(initial_selection) };
        Self {
            registry,
            surface: SurfaceState::Absent,
            selection,
            binding: Binding::Unbound,
            dispatcher: DrawDispatcher::new(),
            reporter,
        }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &SurfaceState {
        &self.surface
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Tears down the current instance, then binds backend `index` to `surface`.
    ///
    /// With no surface, or an empty one, the controller ends up unbound. An
    /// out-of-range index binds backend 0. Construction failures are logged
    /// and leave the controller unbound.
    pub fn rebind(&mut self, surface: Option<SurfaceHandle>, index: usize) {
        let previous = std::mem::take(&mut self.binding);
        let had_binding = previous.is_bound();
        if let Binding::Bound(active) = previous {
            active.teardown();
        }

        let Some(surface) = surface.filter(|s| !s.size().is_empty()) else {
            if had_binding {
                self.reporter.line("Deinitialized");
                self.reporter.emit(EngineEvent::Unbound);
            }
            return;
        };

        if self.registry.is_empty() {
            log::error!(target: "surfacing", "no backends registered, nothing to bind to {}", surface.id());
            return;
        }

        let index = self.registry.clamp(index);
        let name = self
            .registry
            .descriptor(index)
            .map(|d| d.name.clone())
            .unwrap_or_default();
        let capabilities = self.registry.capabilities(index).unwrap_or_else(BackendCapabilities::empty);

        log::debug!(target: "surfacing", "constructing {name} for {} at {}", surface.id(), surface.size());
        match self.registry.construct(index, &surface) {
            Ok(instance) => {
                self.reporter.line(&format!("{name} rendering initialized ({})", surface.size()));
                self.reporter.emit(EngineEvent::Bound { index, name: name.clone(), size: surface.size() });
                self.binding = Binding::Bound(ActiveBinding { index, name, capabilities, surface, instance });
            }
            Err(e) => {
                let err = SurfacingError::BackendInit { backend: name, reason: e.to_string() };
                log::error!(target: "surfacing", "{err}");
                self.reporter.line(&err.to_string());
                self.reporter.emit(EngineEvent::BindingFailed { index, reason: e.to_string() });
            }
        }
    }

    /// Applies a surface lifecycle notification. Returns the acknowledgement
    /// the host expects; this is always `true`.
    pub fn handle_surface_event(&mut self, event: SurfaceEvent) -> bool {
        match event {
            SurfaceEvent::Available(surface) => {
                self.reporter.line(&format!("Texture created ({})", surface.size()));
                self.surface = SurfaceState::Present(surface);
                self.rebind(Some(surface), self.selection.backend_index);
            }
            SurfaceEvent::Resized { id, size } => {
                self.reporter.line(&format!("Texture resized ({size})"));
                self.resize(id, size);
            }
            SurfaceEvent::Destroyed { id } => {
                self.reporter.line("Texture destroyed");
                if self.is_current_surface(id) {
                    self.surface = SurfaceState::Absent;
                    self.rebind(None, self.selection.backend_index);
                } else {
                    log::debug!(target: "surfacing", "ignoring destruction of unknown surface {id}");
                }
            }
        }
        true
    }

    /// Records the new selection and, when a surface exists, rebinds to it.
    pub fn select(&mut self, index: usize) {
        let clamped = self.registry.clamp(index);
        if clamped != index {
            log::warn!(target: "surfacing", "selection {index} out of range, using {clamped}");
        }
        self.selection = Selection { backend_index: clamped };

        if let Some(surface) = self.surface.handle().copied() {
            self.rebind(Some(surface), clamped);
        }
    }

    /// Forwards one frame to the bound instance. A no-op when unbound.
    pub fn draw_frame(&mut self) -> DrawOutcome {
        self.dispatcher.dispatch(&mut self.binding, &self.reporter)
    }

    /// Copy of the last frame, when the bound backend supports it.
    pub fn snapshot(&self) -> Option<RgbaImage> {
        self.binding.active().and_then(|a| a.instance.snapshot())
    }

    /// Tears down any live instance and forgets the surface.
    pub fn shutdown(&mut self) {
        self.surface = SurfaceState::Absent;
        self.rebind(None, self.selection.backend_index);
    }

    fn is_current_surface(&self, id: SurfaceId) -> bool {
        self.surface.handle().is_some_and(|s| s.id() == id)
    }

    fn resize(&mut self, id: SurfaceId, size: SurfaceSize) {
        let SurfaceState::Present(surface) = &mut self.surface else {
            log::debug!(target: "surfacing", "resize of {id} while no surface is present, ignored");
            return;
        };
        if surface.id() != id {
            log::debug!(target: "surfacing", "resize of unknown surface {id}, ignored");
            return;
        }
        surface.resize(size);

        if let Binding::Bound(active) = &mut self.binding {
            active.surface.resize(size);
            active.instance.resize(size);
            self.reporter.emit(EngineEvent::Resized { size });
        }
    }

}

impl Drop for BindingController {
    fn drop(&mut self) {
        if let Binding::Bound(active) = std::mem::take(&mut self.binding) {
            active.teardown();
        }
    }
}
