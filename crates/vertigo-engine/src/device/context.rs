use crate::coords::Viewport;
use crate::paint::Color;

use super::types::{
    BufferId, BufferKind, ContextKind, DrawIndexed, ProgramId, ProgramLayout, ShaderId,
    ShaderStage, SurfaceErrorAction,
};

/// Handle through which resource and draw calls reach the rendering backend.
///
/// The call pattern mirrors a GL-style immediate API so scenes stay backend
/// agnostic:
/// - resources (shaders, programs, buffers) are created and deleted explicitly
///   and referred to by copyable handles
/// - a frame is bracketed by [`begin_frame`](Self::begin_frame) and
///   [`end_frame`](Self::end_frame); viewport, clear and draws in between are
///   recorded and executed at `end_frame`
///
/// Deleting an unknown or already deleted handle is a no-op.
pub trait GraphicsContext {
    /// Adapter class the context was acquired from.
    fn kind(&self) -> ContextKind;

    /// Current drawable size in physical pixels.
    fn drawable_size(&self) -> Viewport;

    /// Resizes the drawable. A zero-sized request is remembered but not applied.
    fn resize(&mut self, width: u32, height: u32);

    /// Compiles one stage. On failure returns the backend's diagnostic log.
    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
        entry_point: &str,
    ) -> Result<ShaderId, String>;

    fn delete_shader(&mut self, shader: ShaderId);

    /// Links a vertex and a fragment stage. On failure returns the link log.
    ///
    /// The stages stay alive after linking; callers delete them when no longer needed.
    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
        layout: &ProgramLayout,
    ) -> Result<ProgramId, String>;

    fn delete_program(&mut self, program: ProgramId);

    /// Whether `program` refers to a live, linked program.
    fn is_program(&self, program: ProgramId) -> bool;

    /// Creates a buffer initialized with `contents`.
    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8]) -> BufferId;

    fn delete_buffer(&mut self, buffer: BufferId);

    /// Acquires the next drawable. `Err` means this frame must not be rendered.
    fn begin_frame(&mut self) -> Result<(), SurfaceErrorAction>;

    fn set_viewport(&mut self, viewport: Viewport);

    /// Clears color and depth for the current frame.
    fn clear(&mut self, color: Color, depth: f32);

    fn draw_indexed(&mut self, draw: &DrawIndexed<'_>);

    /// Executes the recorded frame and presents it.
    fn end_frame(&mut self);
}
