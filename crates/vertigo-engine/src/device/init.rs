/// Initialization parameters for the wgpu context.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is broadly supported and paces frames to the display refresh.
    pub present_mode: wgpu::PresentMode,

    /// Adapter power preference for the primary attempt.
    pub power_preference: wgpu::PowerPreference,

    /// Retry with the fallback adapter when no primary adapter is available.
    pub allow_fallback: bool,

    /// Format of the depth attachment shared by every program.
    pub depth_format: wgpu::TextureFormat,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            power_preference: wgpu::PowerPreference::HighPerformance,
            allow_fallback: true,
            depth_format: wgpu::TextureFormat::Depth32Float,
            required_limits: default_limits(),
            desired_maximum_frame_latency: 2,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_limits() -> wgpu::Limits {
    wgpu::Limits::default()
}

// WebGL2 can not satisfy the WebGPU defaults.
#[cfg(target_arch = "wasm32")]
fn default_limits() -> wgpu::Limits {
    wgpu::Limits::downlevel_webgl2_defaults()
}
