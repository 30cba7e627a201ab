use crate::device::{GraphicsContext, ProgramLayout, ShaderId, ShaderStage, VertexAttribute, VertexFormat};

use super::error::ShaderError;
use super::program::ShaderProgram;

/// Fluent builder for a two-stage [`ShaderProgram`].
///
/// ```ignore
/// let program = shader(ctx.gfx)
///     .vertex(VS)
///     .fragment(FS)
///     .attribute("aVertexPosition", VertexFormat::Float32x3)
///     .attribute("aVertexColor", VertexFormat::Float32x4)
///     .uniforms::<CubeUniforms>()
///     .build()?;
/// ```
///
/// Setting a stage twice keeps the last source. Attributes take shader
/// locations in declaration order.
pub struct ShaderBuilder<'a> {
    gfx: &'a mut dyn GraphicsContext,
    vertex: Option<String>,
    fragment: Option<String>,
    vertex_entry: String,
    fragment_entry: String,
    layout: ProgramLayout,
}

impl<'a> ShaderBuilder<'a> {
    pub fn new(gfx: &'a mut dyn GraphicsContext) -> Self {
        Self {
            gfx,
            vertex: None,
            fragment: None,
            vertex_entry: ShaderStage::Vertex.default_entry_point().to_string(),
            fragment_entry: ShaderStage::Fragment.default_entry_point().to_string(),
            layout: ProgramLayout::default(),
        }
    }

    pub fn vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex = Some(source.into());
        self
    }

    pub fn fragment(mut self, source: impl Into<String>) -> Self {
        self.fragment = Some(source.into());
        self
    }

    /// Declares the next vertex attribute; its location is the number of attributes declared before it.
    pub fn attribute(mut self, name: impl Into<String>, format: VertexFormat) -> Self {
        self.layout.attributes.push(VertexAttribute {
            name: name.into(),
            format,
        });
        self
    }

    /// Declares a uniform block of `size` bytes at `@group(0) @binding(0)`.
    pub fn uniform_block(mut self, size: u64) -> Self {
        self.layout.uniform_size = size;
        self
    }

    /// Declares the uniform block as the layout of `T`.
    pub fn uniforms<T: bytemuck::Pod>(self) -> Self {
        self.uniform_block(std::mem::size_of::<T>() as u64)
    }

    pub fn depth_test(mut self, enabled: bool) -> Self {
        self.layout.depth_test = enabled;
        self
    }

    /// Overrides the entry point names (`vs_main` / `fs_main` by default).
    pub fn entry_points(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.vertex_entry = vertex.into();
        self.fragment_entry = fragment.into();
        self
    }

    /// Compiles both stages and links them.
    ///
    /// Missing sources are reported before the context is touched. On compile
    /// or link failure every intermediate object is released. The stage
    /// objects are released on success too; only the program survives.
    pub fn build(self) -> Result<ShaderProgram, ShaderError> {
        let Self {
            gfx,
            vertex,
            fragment,
            vertex_entry,
            fragment_entry,
            layout,
        } = self;

        let vertex = non_empty(vertex).ok_or(ShaderError::MissingStage(ShaderStage::Vertex))?;
        let fragment =
            non_empty(fragment).ok_or(ShaderError::MissingStage(ShaderStage::Fragment))?;

        let vs = compile(gfx, ShaderStage::Vertex, &vertex, &vertex_entry)?;
        let fs = match compile(gfx, ShaderStage::Fragment, &fragment, &fragment_entry) {
            Ok(fs) => fs,
            Err(e) => {
                gfx.delete_shader(vs);
                return Err(e);
            }
        };

        let linked = gfx.link_program(vs, fs, &layout);

        gfx.delete_shader(vs);
        gfx.delete_shader(fs);

        match linked {
            Ok(id) => {
                log::debug!(
                    "linked shader program {} ({} attributes, {} uniform bytes)",
                    id.raw(),
                    layout.attributes.len(),
                    layout.uniform_size
                );
                Ok(ShaderProgram::new(id, layout))
            }
            Err(log) => {
                log::error!("shader program link failed:\n{log}");
                Err(ShaderError::Link { log })
            }
        }
    }
}

fn non_empty(source: Option<String>) -> Option<String> {
    source.filter(|s| !s.trim().is_empty())
}

fn compile(
    gfx: &mut dyn GraphicsContext,
    stage: ShaderStage,
    source: &str,
    entry_point: &str,
) -> Result<ShaderId, ShaderError> {
    gfx.compile_shader(stage, source, entry_point).map_err(|log| {
        log::error!("{stage} shader compilation failed:\n{log}");
        ShaderError::Compile { stage, log }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{GfxCall, HeadlessContext};
    use crate::shader::shader;

    const VS: &str = r#"
struct Uniforms {
    mvp: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> u: Uniforms;

@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return u.mvp * vec4<f32>(pos, 1.0);
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
"#;

    // ── success ─────────────────────────────────────────────────────────

    #[test]
    fn valid_pair_builds_existing_program() {
        let mut gfx = HeadlessContext::new().with_wgsl_validation();
        let rec = gfx.recorder();

        let mut program = shader(&mut gfx)
            .vertex(VS)
            .fragment(FS)
            .attribute("pos", VertexFormat::Float32x3)
            .uniform_block(64)
            .build()
            .unwrap();

        assert!(program.exists());
        assert_eq!(program.layout().attribute_location("pos"), Some(0));
        // Intermediate stages are released once the program is linked.
        assert_eq!(rec.live_shaders(), 0);
        assert_eq!(rec.live_programs(), 1);

        program.destroy(&mut gfx);
    }

    #[test]
    fn last_source_wins() {
        let mut gfx = HeadlessContext::new().with_wgsl_validation();

        let mut program = shader(&mut gfx)
            .vertex("this is not wgsl")
            .vertex(VS)
            .fragment(FS)
            .attribute("pos", VertexFormat::Float32x3)
            .uniform_block(64)
            .build()
            .unwrap();

        program.destroy(&mut gfx);
    }

    // ── missing stages ──────────────────────────────────────────────────

    #[test]
    fn missing_vertex_fails_before_backend_calls() {
        let mut gfx = HeadlessContext::new();
        let rec = gfx.recorder();

        let err = shader(&mut gfx).fragment(FS).build().unwrap_err();

        assert_eq!(err, ShaderError::MissingStage(ShaderStage::Vertex));
        assert!(rec.calls().is_empty());
    }

    #[test]
    fn missing_fragment_fails_before_backend_calls() {
        let mut gfx = HeadlessContext::new();
        let rec = gfx.recorder();

        let err = shader(&mut gfx).vertex(VS).build().unwrap_err();

        assert_eq!(err, ShaderError::MissingStage(ShaderStage::Fragment));
        assert!(rec.calls().is_empty());
    }

    #[test]
    fn blank_source_counts_as_missing() {
        let mut gfx = HeadlessContext::new();
        let rec = gfx.recorder();

        let err = shader(&mut gfx).vertex("  \n").fragment(FS).build().unwrap_err();

        assert_eq!(err, ShaderError::MissingStage(ShaderStage::Vertex));
        assert!(rec.calls().is_empty());
    }

    // ── backend failures ────────────────────────────────────────────────

    #[test]
    fn compile_failure_carries_log_and_releases_vertex_stage() {
        let mut gfx =
            HeadlessContext::new().with_compile_failure(ShaderStage::Fragment, "0:1: syntax error");
        let rec = gfx.recorder();

        let err = shader(&mut gfx).vertex(VS).fragment(FS).build().unwrap_err();

        assert_eq!(
            err,
            ShaderError::Compile {
                stage: ShaderStage::Fragment,
                log: "0:1: syntax error".to_string(),
            }
        );
        assert_eq!(rec.live_shaders(), 0);
        assert_eq!(rec.live_programs(), 0);
        assert!(rec.calls().iter().any(|c| matches!(c, GfxCall::DeleteShader(_))));
    }

    #[test]
    fn invalid_wgsl_reports_compile_error() {
        let mut gfx = HeadlessContext::new().with_wgsl_validation();
        let rec = gfx.recorder();

        let err = shader(&mut gfx)
            .vertex("fn vs_main( {")
            .fragment(FS)
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            ShaderError::Compile { stage: ShaderStage::Vertex, .. }
        ));
        assert_eq!(rec.live_shaders(), 0);
    }

    #[test]
    fn link_failure_releases_both_stages() {
        let mut gfx = HeadlessContext::new().with_link_failure("varying mismatch");
        let rec = gfx.recorder();

        let err = shader(&mut gfx).vertex(VS).fragment(FS).build().unwrap_err();

        assert_eq!(
            err,
            ShaderError::Link {
                log: "varying mismatch".to_string()
            }
        );
        assert_eq!(rec.live_shaders(), 0);
        assert_eq!(rec.live_programs(), 0);
    }

    #[test]
    fn interface_mismatch_is_a_link_error() {
        let mut gfx = HeadlessContext::new().with_wgsl_validation();

        // No attribute declared for @location(0).
        let err = shader(&mut gfx)
            .vertex(VS)
            .fragment(FS)
            .uniform_block(64)
            .build()
            .unwrap_err();

        assert!(matches!(err, ShaderError::Link { .. }), "{err}");
    }

    // ── destroy ─────────────────────────────────────────────────────────

    #[test]
    fn destroy_is_idempotent() {
        let mut gfx = HeadlessContext::new();
        let rec = gfx.recorder();

        let mut program = shader(&mut gfx).vertex(VS).fragment(FS).build().unwrap();
        let id = program.id().unwrap();

        program.destroy(&mut gfx);
        assert!(!program.exists());
        assert!(!gfx.is_program(id));

        program.destroy(&mut gfx);
        assert!(!program.exists());

        let deletes = rec
            .calls()
            .iter()
            .filter(|c| matches!(c, GfxCall::DeleteProgram(_)))
            .count();
        assert_eq!(deletes, 1);
    }
}
