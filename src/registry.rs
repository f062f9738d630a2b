//! Backend registry.
//!
//! The set of backends is fixed when the registry is built; indices are dense
//! (`0..len`) and stable for the lifetime of the registry.
//!
//! ```
//! use surfacing::registry::BackendRegistry;
//! use surfacing::config::SurfacingConfig;
//!
//! let registry = BackendRegistry::with_defaults(&SurfacingConfig::default());
//! assert_eq!(registry.descriptor(0).unwrap().name, "None");
//! assert_eq!(registry.clamp(999), 0);
//! ```

use std::sync::Arc;
use crate::config::SurfacingConfig;
use crate::render::backends::null::NullBackend;
use crate::render::backends::software::SoftwareBackend;
use crate::render::{BackendCapabilities, BackendInstance, RenderBackend};
use crate::surface::SurfaceHandle;

/// Index and display name of a registered backend, for populating a selection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    pub index: usize,
    pub name: String,
}

/// Ordered, immutable list of available backends.
#[derive(Clone)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn RenderBackend>>,
    descriptors: Vec<BackendDescriptor>,
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("descriptors", &self.descriptors)
            .finish()
    }
}

impl BackendRegistry {
    /// Builds a registry from backends in selection order.
    pub fn new(backends: Vec<Arc<dyn RenderBackend>>) -> Self {
        let descriptors = backends
            .iter()
            .enumerate()
            .map(|(index, b)| BackendDescriptor { index, name: b.name().to_string() })
            .collect();

        Self { backends, descriptors }
    }

    /// `None`, `CPU` and, when compiled in, `Cairo`.
    pub fn with_defaults(config: &SurfacingConfig) -> Self {
        #[allow(unused_mut)]
        let mut backends: Vec<Arc<dyn RenderBackend>> = vec![
            Arc::new(NullBackend::new()),
            Arc::new(SoftwareBackend::new(config.max_surface_pixels)),
        ];

        #[cfg(feature = "backend_cairo")]
        backends.push(Arc::new(crate::render::backends::cairo::CairoBackend::new(config.max_surface_pixels)));

        Self::new(backends)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn descriptor(&self, index: usize) -> Option<&BackendDescriptor> {
        self.descriptors.get(index)
    }

    pub fn descriptors(&self) -> &[BackendDescriptor] {
        &self.descriptors
    }

    pub fn capabilities(&self, index: usize) -> Option<BackendCapabilities> {
        self.backends.get(index).map(|b| b.capabilities())
    }

    /// Maps an out-of-range index to 0.
    #[inline]
    pub fn clamp(&self, index: usize) -> usize {
        if index < self.backends.len() { index } else { 0 }
    }

    /// Initializes backend `index` against `surface`.
    ///
    /// # Panics
    ///
    /// When `index` is out of range. Callers go through [`clamp`](Self::clamp) first.
    pub fn construct(&self, index: usize, surface: &SurfaceHandle) -> anyhow::Result<Box<dyn BackendInstance>> {
        self.backends[index].initialize(surface)
    }
}
