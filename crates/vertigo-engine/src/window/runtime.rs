use std::sync::Arc;

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::ModifiersState;
use winit::window::{Window, WindowId};

use crate::device::{ContextConfig, ContextError, GraphicsContext, WgpuContext};
use crate::engine::{Engine, EngineError, FrameControl};
use crate::input::{
    InputEvent, InputState, Modifiers, MouseButton, MouseButtonState, PointerButtonEvent,
    PointerMoveEvent,
};
use crate::time::HostTimer;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub context: ContextConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vertigo".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
            context: ContextConfig::default(),
        }
    }
}

/// Events delivered to the loop from outside a window callback.
enum RuntimeEvent {
    /// Context acquisition finished.
    ContextReady(Result<Box<dyn GraphicsContext>, ContextError>),
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `engine` inside a winit event loop.
    ///
    /// Native: blocks until the window closes or the engine stops. Returns the
    /// startup error if the engine could not start.
    ///
    /// Web: registers the loop with the browser and returns immediately.
    pub fn run(engine: Engine) -> Result<()> {
        let event_loop = EventLoop::<RuntimeEvent>::with_user_event()
            .build()
            .context("failed to create winit EventLoop")?;
        let proxy = event_loop.create_proxy();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut state = RuntimeState::new(engine, proxy);
            event_loop
                .run_app(&mut state)
                .context("winit event loop terminated with error")?;

            if let Some(err) = state.startup_error.take() {
                return Err(err.into());
            }
            Ok(())
        }

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::EventLoopExtWebSys;

            event_loop.spawn_app(RuntimeState::new(engine, proxy));
            Ok(())
        }
    }
}

struct RuntimeState {
    engine: Engine,
    proxy: EventLoopProxy<RuntimeEvent>,
    timer: HostTimer,

    window: Option<Arc<Window>>,
    acquiring: bool,
    startup_error: Option<EngineError>,
}

impl RuntimeState {
    fn new(engine: Engine, proxy: EventLoopProxy<RuntimeEvent>) -> Self {
        Self {
            engine,
            proxy,
            timer: HostTimer::new(),
            window: None,
            acquiring: false,
            startup_error: None,
        }
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>, ContextError> {
        let config = &self.engine.config().runtime;
        let selector = self.engine.selector();

        let attrs = Window::default_attributes()
            .with_title(format!("{} ({selector})", config.title))
            .with_inner_size(config.initial_size);

        #[cfg(target_arch = "wasm32")]
        let attrs = super::web::attach_canvas(attrs, selector)?;

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| ContextError::Window(e.to_string()))?;

        Ok(Arc::new(window))
    }

    /// Acquires the context for `window` and posts the outcome back to the loop.
    fn acquire_context(&mut self, window: Arc<Window>) {
        self.acquiring = true;

        let config = self.engine.config().runtime.context.clone();
        let proxy = self.proxy.clone();

        let task = async move {
            let result = WgpuContext::acquire(window, config)
                .await
                .map(|gfx| Box::new(gfx) as Box<dyn GraphicsContext>);

            if proxy.send_event(RuntimeEvent::ContextReady(result)).is_err() {
                log::warn!("event loop closed before the graphics context was ready");
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        pollster::block_on(task);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) {
        match self.engine.start() {
            Ok(()) => {
                if let Some(w) = self.window.as_ref() {
                    w.request_redraw();
                }
            }
            Err(err) => {
                self.startup_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.engine.is_running() {
            return;
        }
        let Some(window) = self.window.clone() else {
            return;
        };

        window.pre_present_notify();

        match self.engine.frame(self.timer.now_ms()) {
            FrameControl::Continue => window.request_redraw(),
            FrameControl::Stop => event_loop.exit(),
        }
    }
}

impl ApplicationHandler<RuntimeEvent> for RuntimeState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.acquiring || self.startup_error.is_some() {
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        match self.create_window(event_loop) {
            Ok(window) => {
                self.window = Some(window.clone());
                self.acquire_context(window);
            }
            Err(err) => {
                self.engine.attach_context(Err(err));
                self.start(event_loop);
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: RuntimeEvent) {
        match event {
            RuntimeEvent::ContextReady(result) => {
                self.acquiring = false;
                self.engine.attach_context(result);
                self.start(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        if let Some(ev) = translate_input_event(&window, self.engine.input(), &event) {
            self.engine.handle_input(ev);
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.engine.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                self.engine.resize(new_size.width, new_size.height);
                window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = window.inner_size();
                self.engine.resize(new_size.width, new_size.height);
                window.request_redraw();
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

fn translate_input_event(
    window: &Window,
    state: &InputState,
    event: &WindowEvent,
) -> Option<InputEvent> {
    match event {
        // winit 0.30: ModifiersChanged carries a wrapper with a `state()` accessor.
        WindowEvent::ModifiersChanged(m) => {
            Some(InputEvent::ModifiersChanged(map_modifiers(m.state())))
        }

        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical_f32(window, *position);
            Some(InputEvent::PointerMoved(PointerMoveEvent { x, y }))
        }

        WindowEvent::MouseInput { state: st, button, .. } => {
            let st = match st {
                ElementState::Pressed => MouseButtonState::Pressed,
                ElementState::Released => MouseButtonState::Released,
            };

            // winit 0.30 has no cursor query; use the tracked pointer position.
            let (x, y) = state.pointer_pos.unwrap_or((0.0, 0.0));

            Some(InputEvent::PointerButton(PointerButtonEvent {
                button: map_mouse_button(*button),
                state: st,
                x,
                y,
                modifiers: state.modifiers,
            }))
        }

        _ => None,
    }
}

fn to_logical_f32(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let scale = window.scale_factor();
    let logical = pos.to_logical::<f64>(scale);
    (logical.x as f32, logical.y as f32)
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}
