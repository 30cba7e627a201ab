use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::Viewport;
use crate::paint::Color;

use super::context::GraphicsContext;
use super::error::ContextError;
use super::frame::{GpuFrame, RecordedDraw};
use super::init::ContextConfig;
use super::surface::{self, DepthTarget};
use super::types::{
    BufferId, BufferKind, ContextKind, DrawIndexed, HandleAllocator, ProgramId, ProgramLayout,
    ShaderId, ShaderStage, SurfaceErrorAction,
};
use super::wgsl::{self, CompiledStage};

struct GpuShader {
    compiled: CompiledStage,
    module: wgpu::ShaderModule,
}

struct GpuProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    uniform_size: u64,
    attribute_count: usize,
}

struct GpuBuffer {
    buffer: wgpu::Buffer,
    kind: BufferKind,
}

/// wgpu-backed [`GraphicsContext`] bound to a window surface.
///
/// This type is the low-level rendering context:
/// - creates and stores Instance/Adapter/Device/Queue
/// - creates and configures the Surface (swapchain) and a matching depth target
/// - maps shader, program and buffer handles to wgpu objects
/// - records one frame of draws and submits it in a single render pass
pub struct WgpuContext {
    kind: ContextKind,

    /// Kept alive for the lifetime of the surface.
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    _adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    depth_format: wgpu::TextureFormat,
    depth: Option<DepthTarget>,

    handles: HandleAllocator,
    shaders: HashMap<ShaderId, GpuShader>,
    programs: HashMap<ProgramId, GpuProgram>,
    buffers: HashMap<BufferId, GpuBuffer>,

    frame: Option<GpuFrame>,
}

impl WgpuContext {
    /// Acquires a context for `window`.
    ///
    /// The primary adapter is tried first; when none is available and
    /// `config.allow_fallback` is set, the fallback adapter is requested.
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn acquire(window: Arc<Window>, config: ContextConfig) -> Result<Self, ContextError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| ContextError::Surface(e.to_string()))?;

        let (adapter, kind) = request_adapter(&instance, &surface, &config).await?;
        log::info!("using {:?} adapter: {}", kind, adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("vertigo device"),
                required_features: wgpu::Features::empty(),
                required_limits: config.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| ContextError::Device(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, config.prefer_srgb)
            .ok_or_else(|| ContextError::Surface("no supported surface formats".to_string()))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: config.present_mode,
            alpha_mode: surface::choose_alpha_mode(&surface_caps),
            view_formats: vec![],
            desired_maximum_frame_latency: config.desired_maximum_frame_latency,
        };

        surface.configure(&device, &surface_config);

        Ok(Self {
            kind,
            _instance: instance,
            surface,
            _adapter: adapter,
            device,
            queue,
            config: surface_config,
            size,
            depth_format: config.depth_format,
            depth: None,
            handles: HandleAllocator::default(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            frame: None,
        })
    }

    fn create_pipeline(
        &self,
        vertex: &GpuShader,
        fragment: &GpuShader,
        layout: &ProgramLayout,
    ) -> GpuProgram {
        let bind_group_layout = (layout.uniform_size > 0).then(|| {
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("vertigo uniforms bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(layout.uniform_size),
                        },
                        count: None,
                    }],
                })
        });

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> =
            bind_group_layout.iter().collect();

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("vertigo pipeline layout"),
                bind_group_layouts: &bind_group_layouts,
                immediate_size: 0,
            });

        // One buffer per attribute, each starting at offset 0.
        let attributes: Vec<[wgpu::VertexAttribute; 1]> = layout
            .attributes
            .iter()
            .enumerate()
            .map(|(location, attr)| {
                [wgpu::VertexAttribute {
                    format: attr.format.to_wgpu(),
                    offset: 0,
                    shader_location: location as u32,
                }]
            })
            .collect();

        let vertex_buffers: Vec<wgpu::VertexBufferLayout<'_>> = attributes
            .iter()
            .zip(&layout.attributes)
            .map(|(attrs, attr)| wgpu::VertexBufferLayout {
                array_stride: attr.format.size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        // The render pass always carries a depth attachment, so every pipeline
        // declares depth state; `depth_test = false` turns it into a pass-through.
        let depth_stencil = wgpu::DepthStencilState {
            format: self.depth_format,
            depth_write_enabled: layout.depth_test,
            depth_compare: if layout.depth_test {
                wgpu::CompareFunction::LessEqual
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("vertigo program"),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some(vertex.compiled.entry_point.as_str()),
                    compilation_options: Default::default(),
                    buffers: &vertex_buffers,
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some(fragment.compiled.entry_point.as_str()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: Some(depth_stencil),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        GpuProgram {
            pipeline,
            bind_group_layout,
            uniform_size: layout.uniform_size,
            attribute_count: layout.attributes.len(),
        }
    }

    fn ensure_depth(&mut self) {
        if self.depth.as_ref().is_some_and(|d| d.matches(&self.config)) {
            return;
        }
        self.depth = Some(DepthTarget::new(
            &self.device,
            self.depth_format,
            self.config.width,
            self.config.height,
        ));
    }

    fn execute(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            mut encoder,
            clear,
            viewport,
            draws,
        } = frame;

        let (clear_color, clear_depth) = clear.unwrap_or((Color::BLACK, 1.0));
        let Some(depth) = self.depth.as_ref() else { return };

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vertigo frame"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_depth),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let max_w = self.config.width as f32;
            let max_h = self.config.height as f32;
            let (vw, vh) = viewport.unwrap_or((max_w, max_h));
            rpass.set_viewport(0.0, 0.0, vw.clamp(1.0, max_w), vh.clamp(1.0, max_h), 0.0, 1.0);

            for draw in &draws {
                let Some(program) = self.programs.get(&draw.program) else { continue };
                let Some(index_buffer) = self.buffers.get(&draw.index_buffer) else { continue };

                rpass.set_pipeline(&program.pipeline);
                if let Some(bind_group) = draw.bind_group.as_ref() {
                    rpass.set_bind_group(0, bind_group, &[]);
                }
                for (slot, id) in draw.vertex_buffers.iter().enumerate() {
                    if let Some(buffer) = self.buffers.get(id) {
                        rpass.set_vertex_buffer(slot as u32, buffer.buffer.slice(..));
                    }
                }
                rpass.set_index_buffer(index_buffer.buffer.slice(..), draw.index_format.to_wgpu());
                rpass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    fn record_draw(&self, draw: &DrawIndexed<'_>) -> Option<RecordedDraw> {
        let Some(program) = self.programs.get(&draw.program) else {
            log::warn!("draw with unknown program {:?}; skipped", draw.program);
            return None;
        };

        if draw.vertex_buffers.len() != program.attribute_count {
            log::warn!(
                "draw supplies {} vertex buffers, program expects {}; skipped",
                draw.vertex_buffers.len(),
                program.attribute_count
            );
            return None;
        }

        let valid_buffers = draw
            .vertex_buffers
            .iter()
            .all(|id| self.buffers.get(id).is_some_and(|b| b.kind == BufferKind::Vertex));
        let valid_index = self
            .buffers
            .get(&draw.index_buffer)
            .is_some_and(|b| b.kind == BufferKind::Index);
        if !valid_buffers || !valid_index {
            log::warn!("draw references missing or mismatched buffers; skipped");
            return None;
        }

        let bind_group = match program.bind_group_layout.as_ref() {
            Some(bgl) => {
                if (draw.uniforms.len() as u64) < program.uniform_size {
                    log::warn!(
                        "draw supplies {} uniform bytes, program expects {}; skipped",
                        draw.uniforms.len(),
                        program.uniform_size
                    );
                    return None;
                }

                let ubo = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("vertigo uniforms"),
                        contents: &draw.uniforms[..program.uniform_size as usize],
                        usage: wgpu::BufferUsages::UNIFORM,
                    });

                Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("vertigo uniforms bind group"),
                    layout: bgl,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ubo.as_entire_binding(),
                    }],
                }))
            }
            None => None,
        };

        Some(RecordedDraw {
            program: draw.program,
            vertex_buffers: draw.vertex_buffers.to_vec(),
            index_buffer: draw.index_buffer,
            index_format: draw.index_format,
            index_count: draw.index_count,
            bind_group,
        })
    }
}

impl GraphicsContext for WgpuContext {
    fn kind(&self) -> ContextKind {
        self.kind
    }

    fn drawable_size(&self) -> Viewport {
        Viewport::from_physical(self.config.width, self.config.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            PhysicalSize::new(width, height),
        );
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
        entry_point: &str,
    ) -> Result<ShaderId, String> {
        let compiled = wgsl::compile(stage, source, entry_point)?;

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "vertigo vertex shader",
                    ShaderStage::Fragment => "vertigo fragment shader",
                }),
                source: wgpu::ShaderSource::Wgsl(compiled.source.as_str().into()),
            });

        let id = ShaderId::from_raw(self.handles.next());
        self.shaders.insert(id, GpuShader { compiled, module });
        Ok(id)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
    }

    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
        layout: &ProgramLayout,
    ) -> Result<ProgramId, String> {
        let vs = self
            .shaders
            .get(&vertex)
            .ok_or_else(|| format!("unknown vertex shader {vertex:?}"))?;
        let fs = self
            .shaders
            .get(&fragment)
            .ok_or_else(|| format!("unknown fragment shader {fragment:?}"))?;

        wgsl::link(&vs.compiled, &fs.compiled, layout)?;

        let program = self.create_pipeline(vs, fs, layout);
        let id = ProgramId::from_raw(self.handles.next());
        self.programs.insert(id, program);
        Ok(id)
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
    }

    fn is_program(&self, program: ProgramId) -> bool {
        self.programs.contains_key(&program)
    }

    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8]) -> BufferId {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(match kind {
                    BufferKind::Vertex => "vertigo vbo",
                    BufferKind::Index => "vertigo ibo",
                }),
                contents,
                usage,
            });

        let id = BufferId::from_raw(self.handles.next());
        self.buffers.insert(id, GpuBuffer { buffer, kind });
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if let Some(b) = self.buffers.remove(&buffer) {
            b.buffer.destroy();
        }
    }

    fn begin_frame(&mut self) -> Result<(), SurfaceErrorAction> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(SurfaceErrorAction::SkipFrame);
        }
        if self.frame.is_some() {
            log::warn!("begin_frame called twice; previous frame dropped");
            self.frame = None;
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                return Err(surface::map_surface_error(
                    &self.surface,
                    &self.device,
                    &self.config,
                    self.size,
                    err,
                ));
            }
        };

        self.ensure_depth();

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vertigo frame encoder"),
            });

        self.frame = Some(GpuFrame {
            surface_texture,
            view,
            encoder,
            clear: None,
            viewport: None,
            draws: Vec::new(),
        });
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        if let Some(frame) = self.frame.as_mut() {
            frame.viewport = Some((viewport.width, viewport.height));
        }
    }

    fn clear(&mut self, color: Color, depth: f32) {
        if let Some(frame) = self.frame.as_mut() {
            frame.clear = Some((color, depth));
        }
    }

    fn draw_indexed(&mut self, draw: &DrawIndexed<'_>) {
        if self.frame.is_none() {
            log::warn!("draw_indexed outside of a frame; skipped");
            return;
        }
        let recorded = self.record_draw(draw);
        if let (Some(frame), Some(recorded)) = (self.frame.as_mut(), recorded) {
            frame.draws.push(recorded);
        }
    }

    fn end_frame(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.execute(frame);
        }
    }
}

async fn request_adapter(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'static>,
    config: &ContextConfig,
) -> Result<(wgpu::Adapter, ContextKind), ContextError> {
    let primary = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: config.power_preference,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await;

    let primary_err = match primary {
        Ok(adapter) => return Ok((adapter, ContextKind::Primary)),
        Err(e) => e.to_string(),
    };

    if !config.allow_fallback {
        return Err(ContextError::NoAdapter(primary_err));
    }

    log::warn!("primary adapter unavailable ({primary_err}); trying fallback adapter");

    instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: config.power_preference,
            compatible_surface: Some(surface),
            force_fallback_adapter: true,
        })
        .await
        .map(|adapter| (adapter, ContextKind::Fallback))
        .map_err(|e| ContextError::NoAdapter(format!("{primary_err}; fallback: {e}")))
}
