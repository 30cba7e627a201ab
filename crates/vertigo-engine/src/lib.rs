//! Vertigo engine crate.
//!
//! Owns the graphics context abstraction, the shader program lifecycle, the
//! scene contract and the frame loop that drives it.

pub mod coords;
pub mod core;
pub mod device;
pub mod engine;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod shader;
pub mod time;
pub mod window;

pub use crate::core::{Scene, SceneCtx, UpdateCtx};
pub use crate::engine::{Engine, EngineError, FrameControl};
pub use crate::shader::{shader, ShaderBuilder, ShaderError, ShaderProgram};
