//! Draw dispatcher.
//!
//! Forwards "render one frame" to whatever is bound. Each forwarded draw uses
//! the next colour of [`FRAME_PALETTE`]; draws with nothing bound are silent
//! no-ops and do not advance the palette. A bound backend that does not
//! present frames (the "None" selection) gets no draw either; that is logged.

use crate::binding::Binding;
use crate::errors::SurfacingError;
use crate::events::EngineEvent;
use crate::log_sink::StatusReporter;
use crate::render::{Argb, BackendCapabilities, FRAME_PALETTE};

/// Result of a single draw request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    /// Nothing is bound; no backend was called.
    NotBound,
    /// The bound backend does not present frames; it was not called.
    Skipped { index: usize },
    /// The bound backend rendered a frame.
    Drawn { index: usize, color: Argb, frame_id: u64 },
    /// The bound backend reported an error. The binding stays in place.
    Failed { index: usize, reason: String },
}

impl DrawOutcome {
    pub fn is_drawn(&self) -> bool {
        matches!(self, DrawOutcome::Drawn { .. })
    }
}

#[derive(Debug, Default)]
pub struct DrawDispatcher {
    iteration: usize,
}

impl DrawDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colour the next forwarded draw will use.
    pub fn next_color(&self) -> Argb {
        FRAME_PALETTE[self.iteration % FRAME_PALETTE.len()]
    }

    pub(crate) fn dispatch(&mut self, binding: &mut Binding, reporter: &StatusReporter) -> DrawOutcome {
        let Binding::Bound(active) = binding else {
            return DrawOutcome::NotBound;
        };
        if !active.capabilities.contains(BackendCapabilities::PRESENTS) {
            reporter.line(&format!("Nothing to draw using {}", active.name));
            return DrawOutcome::Skipped { index: active.index };
        }

        let color = self.next_color();
        self.iteration = self.iteration.wrapping_add(1);

        match active.instance.render_frame(color) {
            Ok(()) => {
                reporter.line(&format!("Drawn {color} using {}", active.name));
                reporter.emit(EngineEvent::FrameDrawn { index: active.index, color });
                DrawOutcome::Drawn { index: active.index, color, frame_id: active.instance.frame_id() }
            }
            Err(e) => {
                let err = SurfacingError::Render { backend: active.name.clone(), reason: e.to_string() };
                log::error!(target: "surfacing", "{err}");
                reporter.line(&err.to_string());
                DrawOutcome::Failed { index: active.index, reason: e.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::binding::ActiveBinding;
    use crate::config::SurfacingConfig;
    use crate::log_sink::SharedLogHistory;
    use crate::registry::BackendRegistry;
    use crate::surface::{SurfaceHandle, SurfaceSize};
    use crate::testing::{Call, Recorder};

    fn bound(registry: &BackendRegistry, index: usize) -> Binding {
        let surface = SurfaceHandle::new(SurfaceSize::new(4, 4));
        let instance = registry.construct(index, &surface).unwrap();
        Binding::Bound(ActiveBinding {
            index,
            name: registry.descriptor(index).unwrap().name.clone(),
            capabilities: registry.capabilities(index).unwrap(),
            surface,
            instance,
        })
    }

    fn reporter(history: &SharedLogHistory) -> StatusReporter {
        StatusReporter::new(Arc::new(history.clone()), false, None)
    }

    #[test]
    fn unbound_is_a_silent_noop() {
        let history = SharedLogHistory::new(5);
        let mut dispatcher = DrawDispatcher::new();
        let mut binding = Binding::Unbound;

        assert_eq!(dispatcher.dispatch(&mut binding, &reporter(&history)), DrawOutcome::NotBound);
        assert!(history.snapshot().is_empty());
        assert_eq!(dispatcher.next_color(), FRAME_PALETTE[0]);
    }

    #[test]
    fn cycles_through_palette() {
        let recorder = Recorder::new();
        let history = SharedLogHistory::new(5);
        let mut binding = bound(&recorder.registry(1), 0);
        let mut dispatcher = DrawDispatcher::new();

        for _ in 0..FRAME_PALETTE.len() + 1 {
            assert!(dispatcher.dispatch(&mut binding, &reporter(&history)).is_drawn());
        }

        let colors: Vec<Argb> = recorder
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Render { color, .. } => Some(color),
                _ => None,
            })
            .collect();
        assert_eq!(colors.len(), FRAME_PALETTE.len() + 1);
        assert_eq!(&colors[..FRAME_PALETTE.len()], &FRAME_PALETTE[..]);
        assert_eq!(colors[FRAME_PALETTE.len()], FRAME_PALETTE[0]);
        assert_eq!(history.snapshot().newest(), Some("Drawn 88bf360c using rec-0"));
    }

    #[test]
    fn render_failure_is_reported_not_propagated() {
        let recorder = Recorder::new();
        recorder.fail_render(0);
        let history = SharedLogHistory::new(5);
        let mut binding = bound(&recorder.registry(1), 0);
        let mut dispatcher = DrawDispatcher::new();

        let outcome = dispatcher.dispatch(&mut binding, &reporter(&history));
        assert!(matches!(outcome, DrawOutcome::Failed { index: 0, .. }));
        assert!(binding.is_bound());
        assert!(history.snapshot().contains("Failed to draw using rec-0"));
        assert_eq!(dispatcher.next_color(), FRAME_PALETTE[1]);
    }

    #[test]
    fn backend_without_presents_is_skipped() {
        let registry = BackendRegistry::with_defaults(&SurfacingConfig::default());
        let history = SharedLogHistory::new(5);
        let mut binding = bound(&registry, 0);
        let mut dispatcher = DrawDispatcher::new();

        let outcome = dispatcher.dispatch(&mut binding, &reporter(&history));
        assert_eq!(outcome, DrawOutcome::Skipped { index: 0 });
        assert!(!outcome.is_drawn());
        assert_eq!(history.snapshot().newest(), Some("Nothing to draw using None"));
        assert_eq!(dispatcher.next_color(), FRAME_PALETTE[0]);
        assert_eq!(binding.active().map(ActiveBinding::frame_id), Some(0));
    }
}
