use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::coords::Viewport;
use crate::paint::Color;

use super::context::GraphicsContext;
use super::types::{
    BufferId, BufferKind, ContextKind, DrawIndexed, HandleAllocator, ProgramId, ProgramLayout,
    ShaderId, ShaderStage, SurfaceErrorAction,
};
use super::wgsl::{self, CompiledStage};

/// One call observed by a [`HeadlessContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum GfxCall {
    Resize { width: u32, height: u32 },
    /// `id` is `None` when compilation failed.
    CompileShader { stage: ShaderStage, id: Option<ShaderId> },
    DeleteShader(ShaderId),
    /// `program` is `None` when linking failed.
    LinkProgram { vertex: ShaderId, fragment: ShaderId, program: Option<ProgramId> },
    DeleteProgram(ProgramId),
    CreateBuffer { id: BufferId, kind: BufferKind, len: usize },
    DeleteBuffer(BufferId),
    BeginFrame,
    SetViewport(Viewport),
    Clear { color: Color, depth: f32 },
    DrawIndexed {
        program: ProgramId,
        vertex_buffers: Vec<BufferId>,
        index_buffer: BufferId,
        index_count: u32,
        uniforms: Vec<u8>,
    },
    EndFrame,
}

#[derive(Debug, Default)]
struct HeadlessState {
    calls: Vec<GfxCall>,
    shaders: HashSet<ShaderId>,
    programs: HashSet<ProgramId>,
    buffers: HashMap<BufferId, BufferKind>,
    frames: u64,
    fail_next_frame: Option<SurfaceErrorAction>,
}

/// Shared view into what a [`HeadlessContext`] has recorded.
///
/// The recorder stays usable after the context is moved into an engine.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRecorder {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessRecorder {
    /// Every call observed so far, in order.
    pub fn calls(&self) -> Vec<GfxCall> {
        self.state.borrow().calls.clone()
    }

    /// Only the draw calls.
    pub fn draw_calls(&self) -> Vec<GfxCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, GfxCall::DrawIndexed { .. }))
            .cloned()
            .collect()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    /// Number of completed frames (`end_frame` calls).
    pub fn frames(&self) -> u64 {
        self.state.borrow().frames
    }

    /// Makes the next `begin_frame` fail with `action`.
    pub fn fail_next_frame(&self, action: SurfaceErrorAction) {
        self.state.borrow_mut().fail_next_frame = Some(action);
    }

    fn push(&self, call: GfxCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// [`GraphicsContext`] without a GPU.
///
/// Records every call for inspection through a [`HeadlessRecorder`]. Shader
/// sources are accepted as-is unless WGSL validation is enabled, in which case
/// the same compile and link checks as the wgpu backend run.
pub struct HeadlessContext {
    recorder: HeadlessRecorder,
    size: (u32, u32),
    handles: HandleAllocator,
    validate_wgsl: bool,
    compile_failures: HashMap<ShaderStage, String>,
    link_failure: Option<String>,
    compiled: HashMap<ShaderId, CompiledStage>,
    in_frame: bool,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self {
            recorder: HeadlessRecorder::default(),
            size: (800, 600),
            handles: HandleAllocator::default(),
            validate_wgsl: false,
            compile_failures: HashMap::new(),
            link_failure: None,
            compiled: HashMap::new(),
            in_frame: false,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Every compilation of `stage` fails with `log`.
    pub fn with_compile_failure(mut self, stage: ShaderStage, log: impl Into<String>) -> Self {
        self.compile_failures.insert(stage, log.into());
        self
    }

    /// Every link fails with `log`.
    pub fn with_link_failure(mut self, log: impl Into<String>) -> Self {
        self.link_failure = Some(log.into());
        self
    }

    /// Runs the WGSL front end on compile and link.
    pub fn with_wgsl_validation(mut self) -> Self {
        self.validate_wgsl = true;
        self
    }

    pub fn recorder(&self) -> HeadlessRecorder {
        self.recorder.clone()
    }

    fn try_compile(
        &mut self,
        stage: ShaderStage,
        source: &str,
        entry_point: &str,
    ) -> Result<ShaderId, String> {
        if let Some(log) = self.compile_failures.get(&stage) {
            return Err(log.clone());
        }

        let compiled = if self.validate_wgsl {
            Some(wgsl::compile(stage, source, entry_point)?)
        } else {
            None
        };

        let id = ShaderId::from_raw(self.handles.next());
        if let Some(compiled) = compiled {
            self.compiled.insert(id, compiled);
        }
        self.recorder.state.borrow_mut().shaders.insert(id);
        Ok(id)
    }

    fn try_link(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
        layout: &ProgramLayout,
    ) -> Result<ProgramId, String> {
        {
            let state = self.recorder.state.borrow();
            if !state.shaders.contains(&vertex) || !state.shaders.contains(&fragment) {
                return Err("link requires two live shaders".to_string());
            }
        }
        if let Some(log) = &self.link_failure {
            return Err(log.clone());
        }

        if self.validate_wgsl {
            match (self.compiled.get(&vertex), self.compiled.get(&fragment)) {
                (Some(vs), Some(fs)) => wgsl::link(vs, fs, layout)?,
                _ => return Err("shader was not compiled from WGSL".to_string()),
            }
        }

        let id = ProgramId::from_raw(self.handles.next());
        self.recorder.state.borrow_mut().programs.insert(id);
        Ok(id)
    }
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext for HeadlessContext {
    fn kind(&self) -> ContextKind {
        ContextKind::Headless
    }

    fn drawable_size(&self) -> Viewport {
        Viewport::from_physical(self.size.0, self.size.1)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.recorder.push(GfxCall::Resize { width, height });
        if width > 0 && height > 0 {
            self.size = (width, height);
        }
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
        entry_point: &str,
    ) -> Result<ShaderId, String> {
        let result = self.try_compile(stage, source, entry_point);
        self.recorder.push(GfxCall::CompileShader {
            stage,
            id: result.as_ref().ok().copied(),
        });
        result
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.compiled.remove(&shader);
        self.recorder.state.borrow_mut().shaders.remove(&shader);
        self.recorder.push(GfxCall::DeleteShader(shader));
    }

    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
        layout: &ProgramLayout,
    ) -> Result<ProgramId, String> {
        let result = self.try_link(vertex, fragment, layout);
        self.recorder.push(GfxCall::LinkProgram {
            vertex,
            fragment,
            program: result.as_ref().ok().copied(),
        });
        result
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.recorder.state.borrow_mut().programs.remove(&program);
        self.recorder.push(GfxCall::DeleteProgram(program));
    }

    fn is_program(&self, program: ProgramId) -> bool {
        self.recorder.state.borrow().programs.contains(&program)
    }

    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8]) -> BufferId {
        let id = BufferId::from_raw(self.handles.next());
        self.recorder.state.borrow_mut().buffers.insert(id, kind);
        self.recorder.push(GfxCall::CreateBuffer {
            id,
            kind,
            len: contents.len(),
        });
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.recorder.state.borrow_mut().buffers.remove(&buffer);
        self.recorder.push(GfxCall::DeleteBuffer(buffer));
    }

    fn begin_frame(&mut self) -> Result<(), SurfaceErrorAction> {
        if let Some(action) = self.recorder.state.borrow_mut().fail_next_frame.take() {
            return Err(action);
        }
        self.in_frame = true;
        self.recorder.push(GfxCall::BeginFrame);
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.recorder.push(GfxCall::SetViewport(viewport));
    }

    fn clear(&mut self, color: Color, depth: f32) {
        self.recorder.push(GfxCall::Clear { color, depth });
    }

    fn draw_indexed(&mut self, draw: &DrawIndexed<'_>) {
        if !self.in_frame {
            log::warn!("draw_indexed outside of a frame; skipped");
            return;
        }
        if !self.is_program(draw.program) {
            log::warn!("draw with unknown program {:?}; skipped", draw.program);
            return;
        }
        self.recorder.push(GfxCall::DrawIndexed {
            program: draw.program,
            vertex_buffers: draw.vertex_buffers.to_vec(),
            index_buffer: draw.index_buffer,
            index_count: draw.index_count,
            uniforms: draw.uniforms.to_vec(),
        });
    }

    fn end_frame(&mut self) {
        if !self.in_frame {
            return;
        }
        self.in_frame = false;
        self.recorder.state.borrow_mut().frames += 1;
        self.recorder.push(GfxCall::EndFrame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::IndexFormat;

    #[test]
    fn records_resource_lifecycle() {
        let mut gfx = HeadlessContext::new();
        let rec = gfx.recorder();

        let vs = gfx.compile_shader(ShaderStage::Vertex, "", "vs_main").unwrap();
        let fs = gfx.compile_shader(ShaderStage::Fragment, "", "fs_main").unwrap();
        let prog = gfx.link_program(vs, fs, &ProgramLayout::default()).unwrap();
        assert!(gfx.is_program(prog));
        assert_eq!(rec.live_shaders(), 2);
        assert_eq!(rec.live_programs(), 1);

        gfx.delete_shader(vs);
        gfx.delete_shader(fs);
        gfx.delete_program(prog);
        assert!(!gfx.is_program(prog));
        assert_eq!(rec.live_shaders(), 0);
        assert_eq!(rec.live_programs(), 0);
    }

    #[test]
    fn handles_are_not_reused() {
        let mut gfx = HeadlessContext::new();
        let a = gfx.create_buffer(BufferKind::Vertex, &[0; 12]);
        gfx.delete_buffer(a);
        let b = gfx.create_buffer(BufferKind::Vertex, &[0; 12]);
        assert_ne!(a, b);
    }

    #[test]
    fn compile_failure_is_injected_per_stage() {
        let mut gfx = HeadlessContext::new().with_compile_failure(ShaderStage::Fragment, "boom");
        assert!(gfx.compile_shader(ShaderStage::Vertex, "", "vs_main").is_ok());
        assert_eq!(
            gfx.compile_shader(ShaderStage::Fragment, "", "fs_main"),
            Err("boom".to_string())
        );
        assert_eq!(gfx.recorder().live_shaders(), 1);
    }

    #[test]
    fn failed_frame_is_reported_once() {
        let mut gfx = HeadlessContext::new();
        let rec = gfx.recorder();
        rec.fail_next_frame(SurfaceErrorAction::SkipFrame);

        assert_eq!(gfx.begin_frame(), Err(SurfaceErrorAction::SkipFrame));
        assert_eq!(gfx.begin_frame(), Ok(()));
        gfx.end_frame();
        assert_eq!(rec.frames(), 1);
    }

    #[test]
    fn draw_with_unknown_program_is_skipped() {
        let mut gfx = HeadlessContext::new();
        let rec = gfx.recorder();
        let ibo = gfx.create_buffer(BufferKind::Index, &[0; 6]);

        gfx.begin_frame().unwrap();
        gfx.draw_indexed(&DrawIndexed {
            program: ProgramId::from_raw(99),
            vertex_buffers: &[],
            index_buffer: ibo,
            index_format: IndexFormat::Uint16,
            index_count: 3,
            uniforms: &[],
        });
        gfx.end_frame();

        assert!(rec.draw_calls().is_empty());
    }

    #[test]
    fn zero_resize_keeps_previous_size() {
        let mut gfx = HeadlessContext::new().with_size(320, 240);
        gfx.resize(0, 100);
        assert_eq!(gfx.drawable_size(), Viewport::new(320.0, 240.0));
        gfx.resize(640, 480);
        assert_eq!(gfx.drawable_size(), Viewport::new(640.0, 480.0));
    }
}
