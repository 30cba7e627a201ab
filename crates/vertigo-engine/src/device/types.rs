use std::fmt;

/// Shader pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Entry point name used when the caller does not pick one.
    pub fn default_entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }

    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Backend handle of a compiled, not yet linked, shader stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(u32);

/// Backend handle of a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(u32);

/// Backend handle of a GPU buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(u32);

impl ShaderId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl ProgramId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl BufferId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Monotonic handle allocator shared by the backends.
///
/// Handles are never reused, so a stale handle can not alias a newer resource.
#[derive(Debug, Default)]
pub(crate) struct HandleAllocator {
    next: u32,
}

impl HandleAllocator {
    pub(crate) fn next(&mut self) -> u32 {
        self.next = self.next.wrapping_add(1);
        self.next
    }
}

/// Buffer binding role.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Per-vertex attribute format. All attributes are 32-bit floats.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    pub fn components(self) -> u32 {
        match self {
            VertexFormat::Float32 => 1,
            VertexFormat::Float32x2 => 2,
            VertexFormat::Float32x3 => 3,
            VertexFormat::Float32x4 => 4,
        }
    }

    /// Size of one element in bytes.
    pub fn size(self) -> u64 {
        self.components() as u64 * 4
    }

    pub(crate) fn to_wgpu(self) -> wgpu::VertexFormat {
        match self {
            VertexFormat::Float32 => wgpu::VertexFormat::Float32,
            VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
            VertexFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
            VertexFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
        }
    }
}

/// Named vertex attribute. Its shader location is its index in [`ProgramLayout::attributes`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub name: String,
    pub format: VertexFormat,
}

/// Everything a backend needs besides the two stages to link a program.
///
/// Each attribute is fed from its own vertex buffer (slot = location). The
/// uniform block, if any, lives at `@group(0) @binding(0)`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProgramLayout {
    pub attributes: Vec<VertexAttribute>,

    /// Size of the uniform block in bytes; `0` means the program has no uniforms.
    pub uniform_size: u64,

    /// Depth test with `LessEqual` and depth writes.
    pub depth_test: bool,
}

impl Default for ProgramLayout {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            uniform_size: 0,
            depth_test: true,
        }
    }
}

impl ProgramLayout {
    /// Looks up an attribute location by name.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .position(|a| a.name == name)
            .map(|i| i as u32)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    pub(crate) fn to_wgpu(self) -> wgpu::IndexFormat {
        match self {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        }
    }
}

/// One indexed triangle-list draw.
#[derive(Debug, Clone, Copy)]
pub struct DrawIndexed<'a> {
    pub program: ProgramId,

    /// One buffer per program attribute, in location order.
    pub vertex_buffers: &'a [BufferId],

    pub index_buffer: BufferId,
    pub index_format: IndexFormat,
    pub index_count: u32,

    /// Raw uniform block contents; must be `uniform_size` bytes for programs that declare one.
    pub uniforms: &'a [u8],
}

/// Which adapter class produced the context.
///
/// Both kinds behave identically once acquired.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ContextKind {
    /// Hardware adapter selected by the platform.
    Primary,
    /// Fallback (software or compatibility) adapter, used when no primary adapter is available.
    Fallback,
    /// No GPU; commands are recorded only.
    Headless,
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}
