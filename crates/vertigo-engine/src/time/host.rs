/// Source of frame-callback timestamps, in milliseconds.
///
/// In the browser this is `performance.now()`, the same clock that drives
/// `requestAnimationFrame`. On native targets it is the time since the timer
/// was created.
#[derive(Debug, Clone)]
pub struct HostTimer {
    #[cfg(not(target_arch = "wasm32"))]
    origin: std::time::Instant,
}

impl HostTimer {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            origin: std::time::Instant::now(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    #[cfg(target_arch = "wasm32")]
    pub fn now_ms(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }
}

impl Default for HostTimer {
    fn default() -> Self {
        Self::new()
    }
}
