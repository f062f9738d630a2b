pub mod binding;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod events;
pub mod ffi;
pub mod host;
pub mod log_sink;
pub mod registry;
pub mod render;
pub mod surface;

#[cfg(test)]
mod testing;

pub use config::SurfacingConfig;
pub use engine::SurfacingEngine;
pub use errors::SurfacingError;
