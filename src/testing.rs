//! Instrumented backends that record every call made to them.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use anyhow::{bail, Result};
use crate::registry::BackendRegistry;
use crate::render::{Argb, BackendCapabilities, BackendInstance, RenderBackend};
use crate::surface::{SurfaceHandle, SurfaceId, SurfaceSize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Init { backend: usize, size: SurfaceSize },
    Resize { backend: usize, size: SurfaceSize },
    Render { backend: usize, color: Argb },
    Teardown { backend: usize },
    /// An instance was dropped without `teardown`.
    Leaked { backend: usize },
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    live: usize,
    max_live: usize,
    failing_init: HashSet<usize>,
    failing_render: HashSet<usize>,
}

/// Shared call log for a family of [`RecordingBackend`]s.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    state: Arc<Mutex<State>>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registry of `n` recording backends named `rec-0 .. rec-{n-1}`.
    pub(crate) fn registry(&self, n: usize) -> BackendRegistry {
        let backends: Vec<Arc<dyn RenderBackend>> = (0..n)
            .map(|index| {
                Arc::new(RecordingBackend { index, name: format!("rec-{index}"), recorder: self.clone() })
                    as Arc<dyn RenderBackend>
            })
            .collect();
        BackendRegistry::new(backends)
    }

    pub(crate) fn fail_init(&self, backend: usize) {
        self.state.lock().unwrap().failing_init.insert(backend);
    }

    pub(crate) fn fail_render(&self, backend: usize) {
        self.state.lock().unwrap().failing_render.insert(backend);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    /// Instances currently alive.
    pub(crate) fn live(&self) -> usize {
        self.state.lock().unwrap().live
    }

    /// Highest number of simultaneously alive instances ever observed.
    pub(crate) fn max_live(&self) -> usize {
        self.state.lock().unwrap().max_live
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

struct RecordingBackend {
    index: usize,
    name: String,
    recorder: Recorder,
}

impl RenderBackend for RecordingBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::RESIZE_IN_PLACE | BackendCapabilities::PRESENTS
    }

    fn initialize(&self, surface: &SurfaceHandle) -> Result<Box<dyn BackendInstance>> {
        {
            let mut state = self.recorder.state.lock().unwrap();
            if state.failing_init.contains(&self.index) {
                bail!("surface format rejected");
            }
            state.calls.push(Call::Init { backend: self.index, size: surface.size() });
            state.live += 1;
            state.max_live = state.max_live.max(state.live);
        }

        Ok(Box::new(RecordingInstance {
            index: self.index,
            surface_id: surface.id(),
            size: surface.size(),
            frame_id: 0,
            torn_down: false,
            recorder: self.recorder.clone(),
        }))
    }
}

struct RecordingInstance {
    index: usize,
    surface_id: SurfaceId,
    size: SurfaceSize,
    frame_id: u64,
    torn_down: bool,
    recorder: Recorder,
}

impl BackendInstance for RecordingInstance {
    fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.recorder.record(Call::Resize { backend: self.index, size });
    }

    fn render_frame(&mut self, color: Argb) -> Result<()> {
        if self.recorder.state.lock().unwrap().failing_render.contains(&self.index) {
            bail!("context lost");
        }
        self.recorder.record(Call::Render { backend: self.index, color });
        self.frame_id += 1;
        Ok(())
    }

    fn teardown(&mut self) {
        let mut state = self.recorder.state.lock().unwrap();
        state.calls.push(Call::Teardown { backend: self.index });
        state.live -= 1;
        self.torn_down = true;
    }

    fn frame_id(&self) -> u64 {
        self.frame_id
    }
}

impl Drop for RecordingInstance {
    fn drop(&mut self) {
        if !self.torn_down {
            let mut state = self.recorder.state.lock().unwrap();
            state.calls.push(Call::Leaked { backend: self.index });
            state.live -= 1;
        }
    }
}
