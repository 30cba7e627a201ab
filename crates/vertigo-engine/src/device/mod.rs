//! Graphics context management.
//!
//! This module is responsible for:
//! - the [`GraphicsContext`] handle scenes and shader programs talk to
//! - acquiring a wgpu-backed context for a window surface, with adapter fallback
//! - a headless context that records calls, used by tests and tools
//! - the WGSL compile/link front end both backends share

mod context;
mod error;
mod frame;
mod gpu;
mod headless;
mod init;
mod surface;
mod types;
mod wgsl;

pub use context::GraphicsContext;
pub use error::ContextError;
pub use gpu::WgpuContext;
pub use headless::{GfxCall, HeadlessContext, HeadlessRecorder};
pub use init::ContextConfig;
pub use types::{
    BufferId, BufferKind, ContextKind, DrawIndexed, IndexFormat, ProgramId, ProgramLayout,
    ShaderId, ShaderStage, SurfaceErrorAction, VertexAttribute, VertexFormat,
};
