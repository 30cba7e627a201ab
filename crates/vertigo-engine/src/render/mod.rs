//! Geometry helpers on top of [`GraphicsContext`](crate::device::GraphicsContext).

mod mesh;

pub use mesh::IndexedMesh;
