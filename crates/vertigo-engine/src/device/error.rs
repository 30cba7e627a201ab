use std::fmt;

/// Failure to acquire a graphics context for a display surface.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextError {
    /// No element matched the surface selector, or it is not a canvas.
    SurfaceNotFound(String),
    /// The host window could not be created.
    Window(String),
    /// Neither the primary nor the fallback adapter is available.
    NoAdapter(String),
    /// The adapter refused to create a device.
    Device(String),
    /// The surface could not be created or has no usable format.
    Surface(String),
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextError::SurfaceNotFound(selector) => {
                write!(f, "no canvas matches surface selector `{selector}`")
            }
            ContextError::Window(msg) => write!(f, "failed to create window: {msg}"),
            ContextError::NoAdapter(msg) => write!(f, "no suitable GPU adapter: {msg}"),
            ContextError::Device(msg) => write!(f, "failed to create GPU device: {msg}"),
            ContextError::Surface(msg) => write!(f, "failed to set up drawing surface: {msg}"),
        }
    }
}

impl std::error::Error for ContextError {}
