use crate::core::{FrameControl, Scene, SceneCtx, SurfaceInfo, UpdateCtx};
use crate::device::{ContextError, GraphicsContext, SurfaceErrorAction};
use crate::input::{InputEvent, InputState};
use crate::time::{FrameClock, FrameTime};

use super::config::EngineConfig;
use super::error::EngineError;
use super::notify::{HostNotifier, Notifier};

/// Lifecycle state of an [`Engine`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EngineState {
    /// Not started yet, or the last start attempt failed.
    Idle,
    /// The scene is initialized and frames are being driven.
    Running,
    /// `stop` was called; frames are no longer driven.
    Stopped,
}

/// Owns the graphics context and the active scene and drives the frame loop.
///
/// The context is acquired by the host once its surface exists and handed in
/// through [`attach_context`](Self::attach_context). [`start`](Self::start)
/// initializes the scene; [`frame`](Self::frame) is the per-frame callback.
pub struct Engine {
    surface: SurfaceInfo,
    config: EngineConfig,

    gfx: Option<Box<dyn GraphicsContext>>,
    context_error: Option<ContextError>,

    scene: Option<Box<dyn Scene>>,
    clock: FrameClock,
    input: InputState,
    state: EngineState,

    notifier: Box<dyn Notifier>,
}

impl Engine {
    /// Creates an engine that renders into the surface named by `selector`.
    pub fn new(selector: impl Into<String>) -> Self {
        Self::with_config(selector, EngineConfig::default())
    }

    pub fn with_config(selector: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            surface: SurfaceInfo {
                selector: selector.into(),
            },
            clock: FrameClock::new(config.clock),
            config,
            gfx: None,
            context_error: None,
            scene: None,
            input: InputState::default(),
            state: EngineState::Idle,
            notifier: Box::new(HostNotifier),
        }
    }

    /// Replaces the channel used for user-facing error messages.
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn selector(&self) -> &str {
        &self.surface.selector
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn has_context(&self) -> bool {
        self.gfx.is_some()
    }

    /// Pointer state accumulated from [`handle_input`](Self::handle_input).
    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn scene_name(&self) -> Option<&str> {
        self.scene.as_deref().map(|s| s.name())
    }

    /// Hands the outcome of context acquisition to the engine.
    ///
    /// A failure is recorded and reported by the next [`start`](Self::start).
    /// Ignored while running.
    pub fn attach_context(&mut self, context: Result<Box<dyn GraphicsContext>, ContextError>) {
        if self.is_running() {
            log::warn!("attach_context while running; ignored");
            return;
        }

        match context {
            Ok(gfx) => {
                log::info!(
                    "graphics context attached for '{}' ({:?})",
                    self.surface.selector,
                    gfx.kind()
                );
                self.context_error = None;
                self.gfx = Some(gfx);
            }
            Err(err) => {
                log::error!("graphics context acquisition failed: {err}");
                self.gfx = None;
                self.context_error = Some(err);
            }
        }
    }

    /// Sets the active scene.
    ///
    /// Before the engine runs this only stores the scene. While running, the
    /// outgoing scene is destroyed and the incoming one is initialized before
    /// its first frame; if that fails the engine stops.
    pub fn set_scene(&mut self, scene: impl Scene + 'static) {
        self.set_boxed_scene(Box::new(scene));
    }

    pub fn set_boxed_scene(&mut self, mut scene: Box<dyn Scene>) {
        if !self.is_running() {
            if let Some(old) = self.scene.replace(scene) {
                log::debug!("scene '{}' replaced before start", old.name());
            }
            return;
        }

        let Some(gfx) = self.gfx.as_deref_mut() else {
            self.scene = Some(scene);
            return;
        };

        let result = {
            let mut ctx = SceneCtx {
                gfx,
                surface: &self.surface,
                input: &self.input,
                time: FrameTime::default(),
            };

            if let Some(old) = self.scene.as_deref_mut() {
                log::info!("destroying scene '{}'", old.name());
                old.destroy(&mut ctx);
            }

            let result = scene.init(&mut ctx);
            if result.is_err() {
                scene.destroy(&mut ctx);
            }
            result
        };

        let name = scene.name().to_string();
        self.scene = Some(scene);

        match result {
            Ok(()) => {
                self.clock.reset();
                log::info!("switched to scene '{name}'");
            }
            Err(source) => {
                self.state = EngineState::Stopped;
                self.report(&EngineError::SceneInit {
                    scene: name,
                    source,
                });
            }
        }
    }

    /// Initializes the scene and enters the running state.
    ///
    /// Preconditions are checked in order: a context must be attached, then a
    /// scene must be set. Every failure is logged and shown to the user
    /// through the notifier; the scene is not initialized when the context is
    /// missing. Calling `start` while running is a no-op.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.is_running() {
            return Ok(());
        }

        match self.init_scene() {
            Ok(()) => {
                self.clock.reset();
                self.state = EngineState::Running;
                log::info!(
                    "engine running scene '{}'",
                    self.scene_name().unwrap_or_default()
                );
                Ok(())
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    fn init_scene(&mut self) -> Result<(), EngineError> {
        let Some(gfx) = self.gfx.as_deref_mut() else {
            return Err(EngineError::NoContext(self.context_error.clone()));
        };
        let Some(scene) = self.scene.as_deref_mut() else {
            return Err(EngineError::NoScene);
        };

        let mut ctx = SceneCtx {
            gfx,
            surface: &self.surface,
            input: &self.input,
            time: FrameTime::default(),
        };

        log::debug!("initializing scene '{}'", scene.name());
        scene.init(&mut ctx).map_err(|source| {
            scene.destroy(&mut ctx);
            EngineError::SceneInit {
                scene: scene.name().to_string(),
                source,
            }
        })
    }

    /// Runs one frame at host timestamp `timestamp_ms`.
    ///
    /// Ticks the clock, updates the scene, then renders it between
    /// `begin_frame` and `end_frame`. A frame whose drawable can not be
    /// acquired is skipped after the update; a fatal surface error stops the
    /// engine. Returns [`FrameControl::Stop`] whenever the engine is not running.
    pub fn frame(&mut self, timestamp_ms: f64) -> FrameControl {
        if !self.is_running() {
            return FrameControl::Stop;
        }

        let (Some(gfx), Some(scene)) = (self.gfx.as_deref_mut(), self.scene.as_deref_mut()) else {
            return FrameControl::Stop;
        };

        let time = self.clock.tick(timestamp_ms);

        scene.update(
            &UpdateCtx {
                surface: &self.surface,
                input: &self.input,
                time,
            },
            time.dt,
        );

        let fatal = match gfx.begin_frame() {
            Ok(()) => {
                let mut ctx = SceneCtx {
                    gfx,
                    surface: &self.surface,
                    input: &self.input,
                    time,
                };
                scene.render(&mut ctx, time.dt);
                ctx.gfx.end_frame();
                false
            }
            Err(SurfaceErrorAction::Fatal) => true,
            Err(action) => {
                log::debug!("frame {} skipped ({action:?})", time.frame_index);
                false
            }
        };

        if fatal {
            log::error!("fatal surface error; stopping engine");
            self.notifier.notify("The graphics device was lost.");
            self.stop();
            return FrameControl::Stop;
        }

        FrameControl::Continue
    }

    /// Destroys the scene's resources and ends the loop. Idempotent.
    pub fn stop(&mut self) {
        match self.state {
            EngineState::Stopped => {}
            EngineState::Idle => self.state = EngineState::Stopped,
            EngineState::Running => {
                if let (Some(gfx), Some(scene)) =
                    (self.gfx.as_deref_mut(), self.scene.as_deref_mut())
                {
                    let mut ctx = SceneCtx {
                        gfx,
                        surface: &self.surface,
                        input: &self.input,
                        time: FrameTime::default(),
                    };
                    scene.destroy(&mut ctx);
                }
                self.state = EngineState::Stopped;
                log::info!("engine stopped after {} frames", self.clock.frames());
            }
        }
    }

    /// Updates input state and forwards the event to the running scene.
    pub fn handle_input(&mut self, event: InputEvent) {
        self.input.apply_event(&event);

        if !self.is_running() {
            return;
        }
        if let (Some(gfx), Some(scene)) = (self.gfx.as_deref_mut(), self.scene.as_deref_mut()) {
            let mut ctx = SceneCtx {
                gfx,
                surface: &self.surface,
                input: &self.input,
                time: FrameTime::default(),
            };
            scene.on_input(&mut ctx, &event);
        }
    }

    /// Resizes the drawable, in physical pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(gfx) = self.gfx.as_deref_mut() {
            log::debug!("resize to {width}x{height}");
            gfx.resize(width, height);
        }
    }

    /// Hands the engine to the host runtime and blocks until the loop ends.
    ///
    /// On the web the call returns immediately and the browser drives frames.
    pub fn run(self) -> anyhow::Result<()> {
        crate::window::Runtime::run(self)
    }

    fn report(&mut self, err: &EngineError) {
        log::error!("{err}");
        self.notifier.notify(&err.user_message());
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::device::{BufferId, BufferKind, GfxCall, HeadlessContext, HeadlessRecorder};
    use crate::input::{Modifiers, MouseButton, MouseButtonState, PointerButtonEvent};
    use crate::time::{ClockConfig, FirstFrame};

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        log: Log,
        dts: Rc<RefCell<Vec<f32>>>,
        fail_init: bool,
        buffer: Option<BufferId>,
    }

    impl Probe {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: log.clone(),
                dts: Rc::default(),
                fail_init: false,
                buffer: None,
            }
        }

        fn push(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}:{what}", self.name));
        }
    }

    impl Scene for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn init(&mut self, ctx: &mut SceneCtx<'_>) -> anyhow::Result<()> {
            self.push("init");
            self.buffer = Some(ctx.gfx.create_buffer(BufferKind::Vertex, &[0; 16]));
            if self.fail_init {
                anyhow::bail!("no shaders today");
            }
            Ok(())
        }

        fn update(&mut self, _ctx: &UpdateCtx<'_>, dt: f32) {
            self.push("update");
            self.dts.borrow_mut().push(dt);
        }

        fn render(&mut self, _ctx: &mut SceneCtx<'_>, _dt: f32) {
            self.push("render");
        }

        fn on_input(&mut self, _ctx: &mut SceneCtx<'_>, _event: &InputEvent) {
            self.push("input");
        }

        fn destroy(&mut self, ctx: &mut SceneCtx<'_>) {
            self.push("destroy");
            if let Some(id) = self.buffer.take() {
                ctx.gfx.delete_buffer(id);
            }
        }
    }

    fn engine_with_messages() -> (Engine, Log) {
        let messages: Log = Rc::default();
        let sink = messages.clone();
        let engine = Engine::new("#glCanvas")
            .with_notifier(move |msg: &str| sink.borrow_mut().push(msg.to_string()));
        (engine, messages)
    }

    fn attach_headless(engine: &mut Engine) -> HeadlessRecorder {
        let gfx = HeadlessContext::new();
        let rec = gfx.recorder();
        engine.attach_context(Ok(Box::new(gfx)));
        rec
    }

    fn click() -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
            x: 3.0,
            y: 4.0,
            modifiers: Modifiers::default(),
        })
    }

    // ── start preconditions ─────────────────────────────────────────────

    #[test]
    fn start_without_context_never_inits_scene() {
        let (mut engine, messages) = engine_with_messages();
        let log: Log = Rc::default();
        engine.set_scene(Probe::new("a", &log));

        let err = engine.start().unwrap_err();

        assert!(matches!(err, EngineError::NoContext(None)));
        assert!(log.borrow().is_empty());
        assert_eq!(messages.borrow().len(), 1);
        assert!(messages.borrow()[0].starts_with("Unable to initialize the graphics context"));
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn acquisition_error_is_carried_into_start() {
        let (mut engine, _messages) = engine_with_messages();
        engine.set_scene(Probe::new("a", &Rc::default()));
        engine.attach_context(Err(ContextError::NoAdapter("none".into())));

        let err = engine.start().unwrap_err();

        assert!(matches!(
            err,
            EngineError::NoContext(Some(ContextError::NoAdapter(_)))
        ));
        assert!(!engine.has_context());
    }

    #[test]
    fn start_without_scene_does_not_start_loop() {
        let (mut engine, messages) = engine_with_messages();
        let rec = attach_headless(&mut engine);

        let err = engine.start().unwrap_err();

        assert!(matches!(err, EngineError::NoScene));
        assert_eq!(
            messages.borrow().as_slice(),
            ["A scene must be set before running the engine!".to_string()]
        );
        assert_eq!(engine.frame(16.0), FrameControl::Stop);
        assert!(rec.calls().is_empty());
    }

    #[test]
    fn failed_init_is_reported_and_loop_does_not_run() {
        let (mut engine, messages) = engine_with_messages();
        let rec = attach_headless(&mut engine);
        let log: Log = Rc::default();
        let mut probe = Probe::new("a", &log);
        probe.fail_init = true;
        engine.set_scene(probe);

        let err = engine.start().unwrap_err();

        assert!(matches!(err, EngineError::SceneInit { ref scene, .. } if scene == "a"));
        assert!(messages.borrow()[0].contains("no shaders today"));
        assert_eq!(engine.frame(16.0), FrameControl::Stop);
        assert_eq!(log.borrow().as_slice(), ["a:init", "a:destroy"].map(String::from));
        assert_eq!(rec.live_buffers(), 0);
    }

    // ── frame loop ──────────────────────────────────────────────────────

    #[test]
    fn init_once_then_update_and_render_each_frame() {
        let (mut engine, _messages) = engine_with_messages();
        let rec = attach_headless(&mut engine);
        let log: Log = Rc::default();
        engine.set_scene(Probe::new("a", &log));

        engine.start().unwrap();
        engine.start().unwrap();
        assert_eq!(engine.frame(0.0), FrameControl::Continue);
        assert_eq!(engine.frame(16.0), FrameControl::Continue);

        assert_eq!(
            log.borrow().as_slice(),
            ["a:init", "a:update", "a:render", "a:update", "a:render"].map(String::from)
        );
        assert_eq!(rec.frames(), 2);
    }

    #[test]
    fn default_clock_gives_zero_first_delta() {
        let (mut engine, _messages) = engine_with_messages();
        attach_headless(&mut engine);
        let probe = Probe::new("a", &Rc::default());
        let dts = probe.dts.clone();
        engine.set_scene(probe);
        engine.start().unwrap();

        engine.frame(5000.0);
        engine.frame(5100.0);

        let dts = dts.borrow();
        assert_eq!(dts[0], 0.0);
        assert!((dts[1] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn reference_clock_measures_first_delta_from_zero() {
        let config = EngineConfig {
            clock: ClockConfig {
                first_frame: FirstFrame::SinceOrigin,
                max_delta: None,
            },
            ..Default::default()
        };
        let mut engine = Engine::with_config("#glCanvas", config).with_notifier(|_: &str| {});
        attach_headless(&mut engine);
        let probe = Probe::new("a", &Rc::default());
        let dts = probe.dts.clone();
        engine.set_scene(probe);
        engine.start().unwrap();

        engine.frame(100.0);
        engine.frame(300.0);

        let dts = dts.borrow();
        assert!((dts[0] - 0.1).abs() < 1e-6);
        assert!((dts[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn skipped_frame_updates_but_does_not_render() {
        let (mut engine, _messages) = engine_with_messages();
        let rec = attach_headless(&mut engine);
        let log: Log = Rc::default();
        engine.set_scene(Probe::new("a", &log));
        engine.start().unwrap();

        rec.fail_next_frame(SurfaceErrorAction::SkipFrame);
        assert_eq!(engine.frame(0.0), FrameControl::Continue);

        assert_eq!(log.borrow().as_slice(), ["a:init", "a:update"].map(String::from));
        assert_eq!(rec.frames(), 0);
    }

    #[test]
    fn fatal_surface_error_stops_and_notifies() {
        let (mut engine, messages) = engine_with_messages();
        let rec = attach_headless(&mut engine);
        let log: Log = Rc::default();
        engine.set_scene(Probe::new("a", &log));
        engine.start().unwrap();

        rec.fail_next_frame(SurfaceErrorAction::Fatal);
        assert_eq!(engine.frame(0.0), FrameControl::Stop);

        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(log.borrow().last().map(String::as_str), Some("a:destroy"));
        assert_eq!(messages.borrow().len(), 1);
    }

    // ── stop, swap, input ───────────────────────────────────────────────

    #[test]
    fn stop_is_idempotent_and_destroys_once() {
        let (mut engine, _messages) = engine_with_messages();
        attach_headless(&mut engine);
        let log: Log = Rc::default();
        engine.set_scene(Probe::new("a", &log));
        engine.start().unwrap();

        engine.stop();
        engine.stop();
        drop(engine);

        let destroys = log.borrow().iter().filter(|e| *e == "a:destroy").count();
        assert_eq!(destroys, 1);
    }

    #[test]
    fn frames_after_stop_return_stop() {
        let (mut engine, _messages) = engine_with_messages();
        attach_headless(&mut engine);
        engine.set_scene(Probe::new("a", &Rc::default()));
        engine.start().unwrap();

        engine.stop();

        assert_eq!(engine.frame(16.0), FrameControl::Stop);
    }

    #[test]
    fn dropping_running_engine_destroys_scene() {
        let (mut engine, _messages) = engine_with_messages();
        attach_headless(&mut engine);
        let log: Log = Rc::default();
        engine.set_scene(Probe::new("a", &log));
        engine.start().unwrap();

        drop(engine);

        assert_eq!(log.borrow().last().map(String::as_str), Some("a:destroy"));
    }

    #[test]
    fn set_scene_before_start_has_no_lifecycle_calls() {
        let (mut engine, _messages) = engine_with_messages();
        attach_headless(&mut engine);
        let log: Log = Rc::default();

        engine.set_scene(Probe::new("a", &log));
        engine.set_scene(Probe::new("b", &log));

        assert!(log.borrow().is_empty());
        assert_eq!(engine.scene_name(), Some("b"));
    }

    #[test]
    fn set_scene_while_running_swaps_scenes() {
        let (mut engine, _messages) = engine_with_messages();
        attach_headless(&mut engine);
        let log: Log = Rc::default();
        engine.set_scene(Probe::new("a", &log));
        engine.start().unwrap();
        engine.frame(0.0);

        engine.set_scene(Probe::new("b", &log));
        engine.frame(16.0);

        assert_eq!(
            log.borrow().as_slice(),
            [
                "a:init", "a:update", "a:render", "a:destroy", "b:init", "b:update", "b:render"
            ]
            .map(String::from)
        );
        assert!(engine.is_running());
    }

    #[test]
    fn failed_swap_releases_partial_resources() {
        let (mut engine, messages) = engine_with_messages();
        let rec = attach_headless(&mut engine);
        let log: Log = Rc::default();
        engine.set_scene(Probe::new("a", &log));
        engine.start().unwrap();
        assert_eq!(rec.live_buffers(), 1);

        let mut broken = Probe::new("b", &log);
        broken.fail_init = true;
        engine.set_scene(broken);

        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(engine.frame(16.0), FrameControl::Stop);
        assert!(messages.borrow()[0].contains("no shaders today"));
        drop(engine);

        assert_eq!(
            log.borrow().as_slice(),
            ["a:init", "a:destroy", "b:init", "b:destroy"].map(String::from)
        );
        assert_eq!(rec.live_buffers(), 0);
    }

    #[test]
    fn input_is_forwarded_only_while_running() {
        let (mut engine, _messages) = engine_with_messages();
        attach_headless(&mut engine);
        let log: Log = Rc::default();
        engine.set_scene(Probe::new("a", &log));

        engine.handle_input(click());
        assert!(log.borrow().is_empty());

        engine.start().unwrap();
        engine.handle_input(click());
        assert_eq!(log.borrow().last().map(String::as_str), Some("a:input"));
    }

    #[test]
    fn resize_reaches_context() {
        let (mut engine, _messages) = engine_with_messages();
        let rec = attach_headless(&mut engine);

        engine.resize(640, 480);

        assert_eq!(
            rec.calls(),
            vec![GfxCall::Resize {
                width: 640,
                height: 480
            }]
        );
    }
}
