use crate::paint::Color;

use super::types::{BufferId, IndexFormat, ProgramId};

/// Represents a single acquired frame.
///
/// This object is short-lived and must be finalized promptly. Holding the surface
/// texture prevents acquisition of subsequent frames.
pub(crate) struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,

    pub clear: Option<(Color, f32)>,
    pub viewport: Option<(f32, f32)>,
    pub draws: Vec<RecordedDraw>,
}

/// A draw captured between `begin_frame` and `end_frame`.
///
/// Each draw carries its own uniform buffer so several draws with the same
/// program in one frame do not overwrite each other's uniforms.
pub(crate) struct RecordedDraw {
    pub program: ProgramId,
    pub vertex_buffers: Vec<BufferId>,
    pub index_buffer: BufferId,
    pub index_format: IndexFormat,
    pub index_count: u32,
    pub bind_group: Option<wgpu::BindGroup>,
}
