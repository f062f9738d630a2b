//! Engine configuration.
//!
//! `SurfacingConfig` provides defaults via [`Default`] and a fluent
//! [`SurfacingConfig::builder()`] for customization with validation.
//!
//! # Examples
//!
//! ```rust
//! use surfacing::config::SurfacingConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = SurfacingConfig::builder()
//!     .log_capacity(8)
//!     .default_selection(1)
//!     .max_surface_pixels(4096 * 4096)
//!     .build()?;
//! assert_eq!(cfg.log_capacity, 8);
//! # Ok(()) }
//! ```
//!
//! # Fields
//! - `log_capacity`: lines kept by the rolling log history (default: 5).
//! - `default_selection`: backend index selected at startup (default: 0).
//! - `max_surface_pixels`: largest surface the CPU and Cairo backends will allocate for.
//! - `mirror_to_log`: also write every status line to the `log` facade.

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::log_sink::DEFAULT_LOG_CAPACITY;

const DEFAULT_MAX_SURFACE_PIXELS: u64 = 16384 * 16384;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfacingConfig {
    pub log_capacity: usize,
    pub default_selection: usize,
    pub max_surface_pixels: u64,
    pub mirror_to_log: bool,
}

impl Default for SurfacingConfig {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            default_selection: 0,
            max_surface_pixels: DEFAULT_MAX_SURFACE_PIXELS,
            mirror_to_log: true,
        }
    }
}

impl SurfacingConfig {
    pub fn builder() -> SurfacingConfigBuilder {
        SurfacingConfigBuilder::default()
    }

    /// Checks a config obtained some other way (e.g. deserialized).
    pub fn validate(&self) -> Result<(), SurfacingConfigError> {
        validate(self)
    }
}

/// Builder for [`SurfacingConfig`].
#[derive(Debug, Clone, Default)]
pub struct SurfacingConfigBuilder {
    inner: SurfacingConfig,
}

impl SurfacingConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut SurfacingConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn log_capacity(self, n: usize) -> Self { self.map(|c| c.log_capacity = n) }
    pub fn default_selection(self, index: usize) -> Self { self.map(|c| c.default_selection = index) }
    pub fn max_surface_pixels(self, n: u64) -> Self { self.map(|c| c.max_surface_pixels = n) }
    pub fn mirror_to_log(self, on: bool) -> Self { self.map(|c| c.mirror_to_log = on) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<SurfacingConfig, SurfacingConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum SurfacingConfigError {
    ZeroLogCapacity,
    ZeroSurfacePixels,
}

impl fmt::Display for SurfacingConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfacingConfigError::ZeroLogCapacity =>
                write!(f, "log_capacity must be at least 1"),
            SurfacingConfigError::ZeroSurfacePixels =>
                write!(f, "max_surface_pixels must be at least 1"),
        }
    }
}
impl std::error::Error for SurfacingConfigError {}

fn validate(c: &SurfacingConfig) -> Result<(), SurfacingConfigError> {
    if c.log_capacity == 0 {
        return Err(SurfacingConfigError::ZeroLogCapacity);
    }
    if c.max_surface_pixels == 0 {
        return Err(SurfacingConfigError::ZeroSurfacePixels);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SurfacingConfig::default();
        assert_eq!(cfg.log_capacity, 5);
        assert_eq!(cfg.default_selection, 0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_rejects_zero_capacity() {
        let err = SurfacingConfig::builder().log_capacity(0).build().unwrap_err();
        assert_eq!(err, SurfacingConfigError::ZeroLogCapacity);
        assert_eq!(err.to_string(), "log_capacity must be at least 1");
    }

    #[test]
    fn builder_rejects_zero_pixels() {
        let err = SurfacingConfig::builder().max_surface_pixels(0).build().unwrap_err();
        assert_eq!(err, SurfacingConfigError::ZeroSurfacePixels);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: SurfacingConfig = serde_json::from_str(r#"{ "default_selection": 2 }"#).unwrap();
        assert_eq!(cfg.default_selection, 2);
        assert_eq!(cfg.log_capacity, 5);
        assert!(cfg.mirror_to_log);
    }
}
