use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use vertigo_engine::coords::Viewport;
use vertigo_engine::device::VertexFormat;
use vertigo_engine::input::InputEvent;
use vertigo_engine::paint::Color;
use vertigo_engine::render::IndexedMesh;
use vertigo_engine::{Scene, SceneCtx, ShaderProgram, UpdateCtx, shader};

use crate::geometry::{INDICES, POSITIONS, vertex_colors};

const VS_SOURCE: &str = include_str!("shaders/cube.vert.wgsl");
const FS_SOURCE: &str = include_str!("shaders/cube.frag.wgsl");

const FOV_Y_DEGREES: f32 = 70.0;
const Z_NEAR: f32 = 0.01;
const Z_FAR: f32 = 1000.0;

/// Uniform block layout; field order matches `Uniforms` in `cube.vert.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CubeUniforms {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

/// A cube with one flat color per face, spinning about Z and Y.
pub struct CubeScene {
    position: Vec3,
    angle: f32,
    last_click: Option<(f32, f32)>,
    program: ShaderProgram,
    mesh: IndexedMesh,
}

impl CubeScene {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -6.0),
            angle: 0.0,
            last_click: None,
            program: ShaderProgram::empty(),
            mesh: IndexedMesh::default(),
        }
    }

    /// Rotation in radians accumulated so far.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Surface position of the most recent primary-button press, in logical pixels.
    pub fn last_click(&self) -> Option<(f32, f32)> {
        self.last_click
    }

    /// translate(position) · rotZ(angle) · rotY(0.7 · angle)
    pub fn model_view(position: Vec3, angle: f32) -> Mat4 {
        Mat4::from_translation(position)
            * Mat4::from_rotation_z(angle)
            * Mat4::from_rotation_y(angle * 0.7)
    }

    pub fn projection(viewport: Viewport) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), viewport.aspect(), Z_NEAR, Z_FAR)
    }

    fn uniforms(&self, viewport: Viewport) -> CubeUniforms {
        CubeUniforms {
            model_view: Self::model_view(self.position, self.angle).to_cols_array_2d(),
            projection: Self::projection(viewport).to_cols_array_2d(),
        }
    }
}

impl Default for CubeScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for CubeScene {
    fn name(&self) -> &str {
        "cube"
    }

    fn init(&mut self, ctx: &mut SceneCtx<'_>) -> anyhow::Result<()> {
        self.program = shader(ctx.gfx)
            .vertex(VS_SOURCE)
            .fragment(FS_SOURCE)
            .attribute("aVertexPosition", VertexFormat::Float32x3)
            .attribute("aVertexColor", VertexFormat::Float32x4)
            .uniforms::<CubeUniforms>()
            .build()?;

        let colors = vertex_colors();
        self.mesh = IndexedMesh::upload(
            ctx.gfx,
            &[bytemuck::cast_slice(&POSITIONS), bytemuck::cast_slice(&colors)],
            &INDICES,
        );

        log::info!(
            "cube ready: {} indices, clicks are logged in surface pixels",
            self.mesh.index_count()
        );
        Ok(())
    }

    fn update(&mut self, _ctx: &UpdateCtx<'_>, dt: f32) {
        self.angle += dt;
    }

    fn render(&mut self, ctx: &mut SceneCtx<'_>, _dt: f32) {
        let viewport = ctx.viewport();
        ctx.gfx.set_viewport(viewport);
        ctx.gfx.clear(Color::from_straight(0.0, 0.75, 1.0, 1.0), 1.0);

        let uniforms = self.uniforms(viewport);
        self.mesh
            .draw(ctx.gfx, &self.program, bytemuck::bytes_of(&uniforms));
    }

    fn on_input(&mut self, _ctx: &mut SceneCtx<'_>, event: &InputEvent) {
        if let InputEvent::PointerButton(e) = event {
            if e.is_click() {
                log::info!("click at ({:.1}, {:.1})", e.x, e.y);
                self.last_click = Some((e.x, e.y));
            }
        }
    }

    fn destroy(&mut self, ctx: &mut SceneCtx<'_>) {
        self.program.destroy(ctx.gfx);
        self.mesh.destroy(ctx.gfx);
    }
}
