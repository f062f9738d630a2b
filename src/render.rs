//! Rendering backends and the types they share.
//!
//! A [`RenderBackend`](backend::RenderBackend) is a registered, stateless
//! factory. Calling `initialize` on it against a surface produces a live
//! [`BackendInstance`](backend::BackendInstance), which owns every native
//! resource needed to draw into that surface until it is torn down.

pub mod backend;
pub mod backends;

mod color;
pub use color::*;

pub use backend::{BackendCapabilities, BackendInstance, PixelFormat, RenderBackend, RgbaImage};
