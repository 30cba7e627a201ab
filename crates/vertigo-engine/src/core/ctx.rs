use crate::coords::Viewport;
use crate::device::GraphicsContext;
use crate::input::InputState;
use crate::time::FrameTime;

/// Immutable metadata about the display surface the engine renders into.
#[derive(Debug, Clone, Default)]
pub struct SurfaceInfo {
    /// Selector the engine was created with (CSS selector on the web, window name on native).
    pub selector: String,
}

/// Context passed to [`Scene::init`](super::Scene::init), [`Scene::render`](super::Scene::render)
/// and the other hooks that may touch the GPU.
pub struct SceneCtx<'a> {
    pub gfx: &'a mut dyn GraphicsContext,
    pub surface: &'a SurfaceInfo,
    pub input: &'a InputState,

    /// Timing of the current frame. Outside of a frame (init, destroy, input) this is the
    /// default snapshot.
    pub time: FrameTime,
}

impl<'a> SceneCtx<'a> {
    /// Drawable size in physical pixels.
    pub fn viewport(&self) -> Viewport {
        self.gfx.drawable_size()
    }
}

/// Context passed to [`Scene::update`](super::Scene::update).
///
/// Carries no graphics handle: updates are pure state changes.
pub struct UpdateCtx<'a> {
    pub surface: &'a SurfaceInfo,
    pub input: &'a InputState,
    pub time: FrameTime,
}
