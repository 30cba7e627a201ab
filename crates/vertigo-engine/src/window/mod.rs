//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, acquires the graphics context for
//! the window surface and drives the [`Engine`](crate::Engine) from redraw
//! requests.

mod runtime;
#[cfg(target_arch = "wasm32")]
mod web;

pub use runtime::{Runtime, RuntimeConfig};
