pub mod null;
pub mod software;

#[cfg(feature = "backend_cairo")]
pub mod cairo;
