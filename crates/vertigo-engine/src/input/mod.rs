//! Pointer input.
//!
//! Public API is platform-agnostic and does not expose winit types. The
//! runtime translates window events into [`InputEvent`]s with surface-local
//! logical coordinates and forwards them to the engine.

mod state;
mod types;

pub use state::InputState;
pub use types::{
    InputEvent, Modifiers, MouseButton, MouseButtonState, PointerButtonEvent, PointerMoveEvent,
};
