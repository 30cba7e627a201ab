use crate::device::{BufferId, BufferKind, DrawIndexed, GraphicsContext, IndexFormat};
use crate::shader::ShaderProgram;

/// Indexed triangle list with one vertex buffer per attribute stream.
///
/// Streams are uploaded in attribute-location order and must match the
/// program the mesh is drawn with.
#[derive(Debug, Default)]
pub struct IndexedMesh {
    vertex_buffers: Vec<BufferId>,
    index_buffer: Option<BufferId>,
    index_count: u32,
}

impl IndexedMesh {
    /// Uploads `streams` (one per attribute) and the `u16` index list.
    pub fn upload(gfx: &mut dyn GraphicsContext, streams: &[&[u8]], indices: &[u16]) -> Self {
        let vertex_buffers = streams
            .iter()
            .map(|s| gfx.create_buffer(BufferKind::Vertex, s))
            .collect();

        // wgpu requires buffer sizes to be a multiple of 4 bytes.
        let mut index_bytes: Vec<u8> = bytemuck::cast_slice(indices).to_vec();
        index_bytes.resize(index_bytes.len().next_multiple_of(4), 0);
        let index_buffer = gfx.create_buffer(BufferKind::Index, &index_bytes);

        Self {
            vertex_buffers,
            index_buffer: Some(index_buffer),
            index_count: indices.len() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_uploaded(&self) -> bool {
        self.index_buffer.is_some()
    }

    /// Draws the whole mesh with `program`. Does nothing once either side is destroyed.
    pub fn draw(&self, gfx: &mut dyn GraphicsContext, program: &ShaderProgram, uniforms: &[u8]) {
        let (Some(program), Some(index_buffer)) = (program.id(), self.index_buffer) else {
            return;
        };

        gfx.draw_indexed(&DrawIndexed {
            program,
            vertex_buffers: &self.vertex_buffers,
            index_buffer,
            index_format: IndexFormat::Uint16,
            index_count: self.index_count,
            uniforms,
        });
    }

    /// Releases every buffer. Calling it again is a no-op.
    pub fn destroy(&mut self, gfx: &mut dyn GraphicsContext) {
        for id in self.vertex_buffers.drain(..) {
            gfx.delete_buffer(id);
        }
        if let Some(id) = self.index_buffer.take() {
            gfx.delete_buffer(id);
        }
        self.index_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{GfxCall, HeadlessContext};

    #[test]
    fn index_buffer_is_padded_to_four_bytes() {
        let mut gfx = HeadlessContext::new();
        let rec = gfx.recorder();

        let mut mesh = IndexedMesh::upload(&mut gfx, &[&[0u8; 36]], &[0, 1, 2]);

        assert_eq!(mesh.index_count(), 3);
        let index_len = rec.calls().iter().find_map(|c| match c {
            GfxCall::CreateBuffer { kind: BufferKind::Index, len, .. } => Some(*len),
            _ => None,
        });
        assert_eq!(index_len, Some(8));

        mesh.destroy(&mut gfx);
    }

    #[test]
    fn destroy_releases_all_buffers_once() {
        let mut gfx = HeadlessContext::new();
        let rec = gfx.recorder();

        let mut mesh = IndexedMesh::upload(&mut gfx, &[&[0u8; 12], &[0u8; 16]], &[0, 0, 0]);
        assert_eq!(rec.live_buffers(), 3);

        mesh.destroy(&mut gfx);
        mesh.destroy(&mut gfx);

        assert_eq!(rec.live_buffers(), 0);
        assert!(!mesh.is_uploaded());
        let deletes = rec
            .calls()
            .iter()
            .filter(|c| matches!(c, GfxCall::DeleteBuffer(_)))
            .count();
        assert_eq!(deletes, 3);
    }
}
