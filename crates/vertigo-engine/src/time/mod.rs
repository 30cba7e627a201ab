//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per engine
//! - feed it the host's frame-callback timestamp once per frame via `tick()`

mod frame_clock;
mod host;

pub use frame_clock::{ClockConfig, FirstFrame, FrameClock, FrameTime};
pub use host::HostTimer;
