use glam::Affine2;

use super::traits::{DebugVertex, DrawContext, ImageId, Topology};

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawBatch {
    /// First vertex in `DebugDrawBuffer::vertices`.
    pub first_vertex: u32,
    pub vertex_count: u32,
    /// First index in `DebugDrawBuffer::indices`.
    pub first_index: u32,
    pub index_count: u32,
    pub topology: Topology,
    pub image: Option<ImageId>,
    pub transform: Affine2,
}

/// A [`DrawContext`] that records draw calls into flat buffers.
///
/// Indices are rebased onto the shared vertex buffer, so the whole frame can
/// be uploaded in one go.
#[derive(Debug, Clone)]
pub struct DebugDrawBuffer {
    pub vertices: Vec<DebugVertex>,
    pub indices: Vec<u32>,
    pub batches: Vec<DrawBatch>,
    image: Option<ImageId>,
    transform: Affine2,
}

impl DebugDrawBuffer {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            batches: Vec::new(),
            image: None,
            transform: Affine2::IDENTITY,
        }
    }

    /// Drop recorded geometry. Bound image and transform are kept.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.batches.clear();
    }

    pub fn current_image(&self) -> Option<ImageId> {
        self.image
    }

    pub fn current_transform(&self) -> Affine2 {
        self.transform
    }

    /// Vertices of one batch.
    pub fn batch_vertices(&self, batch: &DrawBatch) -> &[DebugVertex] {
        let start = batch.first_vertex as usize;
        &self.vertices[start..start + batch.vertex_count as usize]
    }

    /// Indices of one batch, local to its own vertices.
    pub fn batch_indices(&self, batch: &DrawBatch) -> Vec<u32> {
        let start = batch.first_index as usize;
        self.indices[start..start + batch.index_count as usize]
            .iter()
            .map(|i| i - batch.first_vertex)
            .collect()
    }

    /// Raw vertex floats for upload.
    pub fn vertex_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Default for DebugDrawBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawContext for DebugDrawBuffer {
    fn set_image(&mut self, image: Option<ImageId>) {
        self.image = image;
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.transform = transform;
    }

    fn draw(&mut self, vertices: &[DebugVertex], indices: &[u16], topology: Topology) {
        let first_vertex = self.vertices.len() as u32;
        let first_index = self.indices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.indices
            .extend(indices.iter().map(|&i| first_vertex + i as u32));
        self.batches.push(DrawBatch {
            first_vertex,
            vertex_count: vertices.len() as u32,
            first_index,
            index_count: indices.len() as u32,
            topology,
            image: self.image,
            transform: self.transform,
        });
    }
}
