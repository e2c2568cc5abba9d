//! Debug rendering: collider wireframes as line lists.
//!
//! Backends call [`draw_collider`] with the collider's shape and the owning
//! body's current pose; the outline is moved into world space, scaled to
//! presentation units and submitted as one `LineList` draw.

use glam::Vec2;

use crate::core::shape::{ColliderShape, MAX_POLYGON_VERTICES};
use crate::core::units::UnitScale;
use crate::renderer::traits::{DebugVertex, DrawContext, Topology};

/// Pose of a body in simulation units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub translation: Vec2,
    pub rotation: f32,
}

impl BodyPose {
    pub fn new(translation: Vec2, rotation: f32) -> Self {
        Self { translation, rotation }
    }

    #[inline]
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.translation + Vec2::from_angle(self.rotation).rotate(local)
    }
}

/// Line-list indices walking `count` points in order.
/// A closed loop also joins the last point back to the first.
/// Empty when `count` exceeds what 16-bit indices can address.
pub fn line_list_indices(count: usize, closed: bool) -> Vec<u16> {
    if count > MAX_POLYGON_VERTICES {
        log::warn!("outline of {} points exceeds 16-bit indices; not drawn", count);
        return Vec::new();
    }
    let segments = match (count, closed) {
        (0 | 1, _) => 0,
        (n, true) => n,
        (n, false) => n - 1,
    };
    let mut indices = Vec::with_capacity(segments * 2);
    for i in 0..segments {
        indices.push(i as u16);
        indices.push(((i + 1) % count) as u16);
    }
    indices
}

/// Presentation-space vertices and line-list indices for one collider.
pub fn collider_wireframe(
    shape: &ColliderShape,
    pose: BodyPose,
    scale: UnitScale,
    color: [f32; 4],
) -> (Vec<DebugVertex>, Vec<u16>) {
    let outline = shape.outline();
    let vertices = outline
        .points
        .iter()
        .map(|p| DebugVertex::new(scale.vec_to_presentation(pose.transform_point(*p)), color))
        .collect::<Vec<_>>();
    let indices = line_list_indices(vertices.len(), outline.closed);
    (vertices, indices)
}

/// Emit the wireframe of one collider into `ctx`.
pub fn draw_collider(
    ctx: &mut dyn DrawContext,
    shape: &ColliderShape,
    pose: BodyPose,
    scale: UnitScale,
    color: [f32; 4],
) {
    let (vertices, indices) = collider_wireframe(shape, pose, scale, color);
    if indices.is_empty() {
        return;
    }
    ctx.draw(&vertices, &indices, Topology::LineList);
}
