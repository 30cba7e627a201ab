//! Core engine-facing contracts.
//!
//! This module defines the interface between the engine's frame loop and
//! scenes: the [`Scene`] lifecycle and the contexts handed to each hook.

mod ctx;
mod scene;

pub use ctx::{SceneCtx, SurfaceInfo, UpdateCtx};
pub use scene::{FrameControl, Scene};
