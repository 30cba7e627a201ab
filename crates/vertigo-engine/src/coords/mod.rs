//! Coordinate and size primitives shared by the device and scene layers.

mod viewport;

pub use viewport::Viewport;
