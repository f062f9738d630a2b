use crate::config::SurfacingConfigError;

#[derive(Debug, thiserror::Error)]
pub enum SurfacingError {
    #[error("Failed to initialize {backend}: {reason}")]
    BackendInit { backend: String, reason: String },

    #[error("Failed to draw using {backend}: {reason}")]
    Render { backend: String, reason: String },

    #[error("Host command channel closed")]
    ChannelClosed,

    #[error("Host is already running")]
    HostAlreadyRunning,

    #[error("Invalid configuration: {0}")]
    Config(#[from] SurfacingConfigError),
}
