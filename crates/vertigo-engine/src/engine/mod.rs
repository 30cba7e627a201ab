//! Engine: owns the graphics context and the active scene, and drives the frame loop.
//!
//! The host runtime (see [`crate::window`]) acquires a context, hands it to the
//! engine, calls [`Engine::start`] once and then [`Engine::frame`] once per
//! redraw. Embedders and tests drive the same methods directly.

mod config;
mod driver;
mod error;
mod notify;

pub use config::EngineConfig;
pub use driver::{Engine, EngineState};
pub use error::EngineError;
pub use notify::{HostNotifier, Notifier};

pub use crate::core::FrameControl;
