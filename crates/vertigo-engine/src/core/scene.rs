use crate::input::InputEvent;

use super::ctx::{SceneCtx, UpdateCtx};

/// Control directive returned by the frame callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameControl {
    /// Schedule the next frame.
    Continue,
    /// The loop is over; no further frames will run.
    Stop,
}

/// Unit of behavior driven by the engine.
///
/// Lifecycle:
/// 1. `init` exactly once, before the first frame
/// 2. `update` then `render`, once per frame
/// 3. `destroy` once, when the engine stops or replaces the scene
///
/// A scene owns every GPU resource it creates in `init` and releases them in
/// `destroy`. When `init` fails, `destroy` is still called so that anything
/// allocated before the failure is released; it must cope with a partially
/// initialized scene.
pub trait Scene {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Builds programs and uploads buffers. The scene must be ready to render afterwards.
    fn init(&mut self, ctx: &mut SceneCtx<'_>) -> anyhow::Result<()>;

    /// Advances simulation state by `dt` seconds. No GPU access.
    fn update(&mut self, ctx: &UpdateCtx<'_>, dt: f32);

    /// Issues the draw calls for the current frame.
    fn render(&mut self, ctx: &mut SceneCtx<'_>, dt: f32);

    /// Called for every input event while the scene is active.
    fn on_input(&mut self, ctx: &mut SceneCtx<'_>, event: &InputEvent) {
        let _ = (ctx, event);
    }

    /// Releases the scene's GPU resources.
    fn destroy(&mut self, ctx: &mut SceneCtx<'_>) {
        let _ = ctx;
    }
}
