//! Backend-agnostic physics contract.
//!
//! Engine code talks to [`PhysicsWorld`], [`PhysicsBody`] and
//! [`PhysicsCollider`] only. A backend owns its native handles and hands out
//! short-lived views (`world.body(id)?`) that borrow the world, so a stale
//! id is always caught at lookup time instead of touching freed state.

use glam::Vec2;

use crate::api::event::CollisionListener;
use crate::api::types::{BodyId, BodyKind, ColliderId, NodeId, Region};
use crate::core::shape::ColliderShape;
use crate::error::{PhysicsError, Result};
use crate::renderer::traits::DrawContext;

/// Broad-phase region lookup.
///
/// All bookkeeping lives in the call itself, so a query issued from inside a
/// collision listener cannot disturb one already in flight.
pub trait SpatialQuery {
    /// Hand each live collider whose bounding box overlaps `region` and whose
    /// layers intersect `layer_mask` to `visit`, in the backend's traversal
    /// order. Traversal stops as soon as `visit` returns `false`.
    fn visit_region(&self, region: &Region, layer_mask: u32, visit: &mut dyn FnMut(ColliderId) -> bool);

    /// Write matching colliders into `results`, stopping once it is full.
    /// Returns the number written.
    fn query(&self, region: &Region, layer_mask: u32, results: &mut [ColliderId]) -> usize {
        let capacity = results.len();
        if capacity == 0 {
            return 0;
        }
        let mut written = 0;
        self.visit_region(region, layer_mask, &mut |id: ColliderId| {
            results[written] = id;
            written += 1;
            written < capacity
        });
        written
    }

    /// Like [`query`](Self::query), collecting at most `max_results` ids.
    /// Memory grows with the number of hits, not with `max_results`.
    fn query_vec(&self, region: &Region, layer_mask: u32, max_results: usize) -> Vec<ColliderId> {
        let mut results = Vec::new();
        if max_results == 0 {
            return results;
        }
        self.visit_region(region, layer_mask, &mut |id: ColliderId| {
            results.push(id);
            results.len() < max_results
        });
        results
    }
}

/// A simulation instance. Factory for bodies, driver of the step.
pub trait PhysicsWorld: SpatialQuery {
    type Body<'w>: PhysicsBody
    where
        Self: 'w;
    type Collider<'w>: PhysicsCollider
    where
        Self: 'w;

    /// Allocate a body of `kind`.
    ///
    /// # Panics
    /// If the world has been disposed.
    fn create_body(&mut self, kind: BodyKind) -> BodyId;

    fn create_rigid_body(&mut self) -> BodyId {
        self.create_body(BodyKind::Dynamic)
    }

    fn create_static_body(&mut self) -> BodyId {
        self.create_body(BodyKind::Static)
    }

    fn create_kinematic_body(&mut self) -> BodyId {
        self.create_body(BodyKind::Kinematic)
    }

    /// View of a live body. Fails with `BodyDisposed` for a removed body.
    fn body(&mut self, id: BodyId) -> Result<Self::Body<'_>>;

    /// View of a live collider. Fails with `ColliderDisposed` for a removed collider.
    fn collider(&mut self, id: ColliderId) -> Result<Self::Collider<'_>>;

    fn contains_body(&self, id: BodyId) -> bool;

    fn contains_collider(&self, id: ColliderId) -> bool;

    /// Dispose a body and all its colliders. Removing twice is a no-op.
    fn remove_body(&mut self, id: BodyId);

    /// Dispose one collider. Removing twice is a no-op.
    fn remove_collider(&mut self, id: ColliderId);

    /// Advance the simulation by exactly `dt` seconds in one step.
    /// Collision listeners run before this returns.
    fn step(&mut self, dt: f32) -> Result<()>;

    /// Emit wireframes of every live collider whose layers intersect `layer_mask`.
    fn draw_debug(&self, ctx: &mut dyn DrawContext, layer_mask: u32);

    /// Dispose every body and the backend context. Disposing twice is a no-op.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// View of one rigid body.
pub trait PhysicsBody {
    fn id(&self) -> BodyId;

    fn kind(&self) -> BodyKind;

    fn is_kinematic(&self) -> bool {
        self.kind() == BodyKind::Kinematic
    }

    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);

    fn rotation(&self) -> f32;

    fn linear_velocity(&self) -> Vec2;
    fn set_linear_velocity(&mut self, velocity: Vec2);

    fn linear_damping(&self) -> f32;
    fn set_linear_damping(&mut self, damping: f32);

    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);

    /// Continuous collision detection.
    fn is_bullet(&self) -> bool;
    fn set_bullet(&mut self, bullet: bool);

    fn user_data(&self) -> Option<NodeId>;
    fn set_user_data(&mut self, node: Option<NodeId>);

    /// Mark every collider currently on this body as a sensor (or not).
    fn set_sensor(&mut self, sensor: bool);

    /// Set the "is" layers of every collider currently on this body.
    fn set_layers(&mut self, layers: u32);

    /// Set the "collides with" layers of every collider currently on this body.
    fn set_collides_with(&mut self, collides_with: u32);

    /// Accumulate a force for the next step. Ignored on static bodies.
    fn apply_force(&mut self, force: Vec2);

    /// Apply an instantaneous impulse. Ignored on static bodies.
    fn apply_impulse(&mut self, impulse: Vec2);

    /// Colliders owned by this body, in attachment order.
    fn colliders(&self) -> Vec<ColliderId>;

    /// Install (or clear) the listener for contact-begin events.
    fn set_collision_listener(&mut self, listener: Option<CollisionListener>);

    /// Attach a collider with the given body-local geometry.
    fn add_collider(&mut self, shape: ColliderShape) -> Result<ColliderId>;

    fn add_box_collider(&mut self, center: Vec2, size: Vec2) -> Result<ColliderId> {
        self.add_collider(ColliderShape::rect(center, size)?)
    }

    fn add_circle_collider(&mut self, center: Vec2, radius: f32) -> Result<ColliderId> {
        self.add_collider(ColliderShape::circle(center, radius)?)
    }

    fn add_polygon_collider(&mut self, position: Vec2, points: &[Vec2]) -> Result<ColliderId> {
        self.add_collider(ColliderShape::polygon(position, points)?)
    }

    fn add_edge_collider(&mut self, start: Vec2, end: Vec2) -> Result<ColliderId> {
        self.add_collider(ColliderShape::edge(start, end)?)
    }

    /// Chain colliders are not supported; this always fails and creates nothing.
    fn add_chain_collider(&mut self, _position: Vec2, points: &[Vec2], looped: bool) -> Result<ColliderId> {
        log::warn!(
            "chain collider ({} points, looped={}) requested on {:?}: unsupported",
            points.len(),
            looped,
            self.id()
        );
        Err(PhysicsError::Unsupported("chain collider"))
    }

    /// Remove the body and its colliders from the simulation.
    fn dispose(self)
    where
        Self: Sized;
}

/// View of one collider.
pub trait PhysicsCollider {
    fn id(&self) -> ColliderId;

    /// The owning body.
    fn body(&self) -> BodyId;

    fn shape(&self) -> &ColliderShape;

    fn layers(&self) -> u32;
    fn set_layers(&mut self, layers: u32);

    fn collides_with(&self) -> u32;
    fn set_collides_with(&mut self, collides_with: u32);

    fn node(&self) -> Option<NodeId>;
    fn set_node(&mut self, node: Option<NodeId>);

    fn is_sensor(&self) -> bool;
    fn set_sensor(&mut self, sensor: bool);

    /// Emit this collider's wireframe in presentation coordinates.
    fn draw_debug(&self, ctx: &mut dyn DrawContext);

    /// Detach and destroy the collider.
    fn dispose(self)
    where
        Self: Sized;
}
