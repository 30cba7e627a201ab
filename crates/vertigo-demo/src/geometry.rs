//! Unit cube: four vertices per face so every face gets a flat color.

pub const VERTEX_COUNT: usize = 24;

#[rustfmt::skip]
pub const POSITIONS: [[f32; 3]; VERTEX_COUNT] = [
    // Front
    [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0],
    // Back
    [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],
    // Top
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0],
    // Bottom
    [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],
    // Right
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0],
    // Left
    [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],
];

/// Front, back, top, bottom, right, left.
pub const FACE_COLORS: [[f32; 4]; 6] = [
    [1.0, 1.0, 1.0, 1.0], // white
    [1.0, 0.0, 0.0, 1.0], // red
    [0.0, 1.0, 0.0, 1.0], // green
    [0.0, 0.0, 1.0, 1.0], // blue
    [1.0, 1.0, 0.0, 1.0], // yellow
    [1.0, 0.0, 1.0, 1.0], // purple
];

#[rustfmt::skip]
pub const INDICES: [u16; 36] = [
     0,  1,  2,   0,  2,  3, // front
     4,  5,  6,   4,  6,  7, // back
     8,  9, 10,   8, 10, 11, // top
    12, 13, 14,  12, 14, 15, // bottom
    16, 17, 18,  16, 18, 19, // right
    20, 21, 22,  20, 22, 23, // left
];

/// Per-vertex colors: each face color repeated for its four vertices.
pub fn vertex_colors() -> [[f32; 4]; VERTEX_COUNT] {
    std::array::from_fn(|i| FACE_COLORS[i / 4])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_face_is_two_triangles_over_its_own_vertices() {
        for (face, tri) in INDICES.chunks(6).enumerate() {
            let base = (face * 4) as u16;
            assert!(tri.iter().all(|&i| (base..base + 4).contains(&i)));
        }
    }

    #[test]
    fn colors_are_flat_per_face() {
        let colors = vertex_colors();
        assert_eq!(colors[0], colors[3]);
        assert_eq!(colors[4], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(colors[23], [1.0, 0.0, 1.0, 1.0]);
    }
}
