//! Shader program construction and ownership.
//!
//! [`ShaderBuilder`] collects the two stage sources and the program layout,
//! then compiles and links them through a [`GraphicsContext`]. The result is a
//! [`ShaderProgram`] that owns the linked program until it is destroyed.

mod builder;
mod error;
mod program;

pub use builder::ShaderBuilder;
pub use error::ShaderError;
pub use program::ShaderProgram;

use crate::device::GraphicsContext;

/// Starts a [`ShaderBuilder`] against `gfx`.
pub fn shader(gfx: &mut dyn GraphicsContext) -> ShaderBuilder<'_> {
    ShaderBuilder::new(gfx)
}
