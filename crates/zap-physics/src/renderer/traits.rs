//! Drawing context consumed by debug draw.
//!
//! The physics layer never talks to a GPU. It hands line lists to whatever
//! implements [`DrawContext`]: the engine's renderer, or a
//! [`DebugDrawBuffer`](super::debug_buffer::DebugDrawBuffer) that records them.

use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};

/// Opaque handle of a texture bound by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// Primitive topology of a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Every pair of indices is one segment.
    LineList,
}

/// Debug vertex. 6 floats per vertex (x, y, r, g, b, a),
/// the same layout as the engine's vector vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DebugVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl DebugVertex {
    pub const FLOATS: usize = 6;

    pub fn new(pos: Vec2, color: [f32; 4]) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            r: color[0],
            g: color[1],
            b: color[2],
            a: color[3],
        }
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// A sink for primitive draw calls.
pub trait DrawContext {
    /// Bind a texture for subsequent draws. `None` draws untextured.
    fn set_image(&mut self, image: Option<ImageId>);

    /// Set the transform applied to subsequent draws.
    fn set_transform(&mut self, transform: Affine2);

    /// Submit one primitive batch. Indices refer into `vertices`.
    fn draw(&mut self, vertices: &[DebugVertex], indices: &[u16], topology: Topology);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_vertex_is_six_floats() {
        assert_eq!(
            std::mem::size_of::<DebugVertex>(),
            DebugVertex::FLOATS * std::mem::size_of::<f32>()
        );
    }

    #[test]
    fn debug_vertex_round_trips_position() {
        let v = DebugVertex::new(Vec2::new(3.0, -4.0), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(v.pos(), Vec2::new(3.0, -4.0));
        assert_eq!(v.g, 1.0);
    }
}
