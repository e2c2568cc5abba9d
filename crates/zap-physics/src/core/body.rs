use glam::Vec2;
use rapier2d::prelude::{ColliderHandle, RigidBody, RigidBodyHandle};

use crate::api::event::CollisionListener;
use crate::api::traits::{PhysicsBody, PhysicsCollider, PhysicsWorld};
use crate::api::types::{BodyId, BodyKind, ColliderId, NodeId};
use crate::core::physics::{na_to_vec2, vec2_to_na, BodyRecord, RapierWorld};
use crate::core::shape::ColliderShape;
use crate::error::Result;

/// Borrowed view of one body in a [`RapierWorld`].
pub struct RapierBody<'w> {
    world: &'w mut RapierWorld,
    id: BodyId,
    handle: RigidBodyHandle,
}

impl<'w> RapierBody<'w> {
    pub(crate) fn new(world: &'w mut RapierWorld, id: BodyId, handle: RigidBodyHandle) -> Self {
        Self { world, id, handle }
    }

    fn rb(&self) -> &RigidBody {
        &self.world.bodies[self.handle]
    }

    fn rb_mut(&mut self) -> &mut RigidBody {
        &mut self.world.bodies[self.handle]
    }

    fn record(&self) -> &BodyRecord {
        &self.world.body_records[self.id]
    }

    fn record_mut(&mut self) -> &mut BodyRecord {
        &mut self.world.body_records[self.id]
    }

    fn collider_handles(&self) -> Vec<ColliderHandle> {
        self.record()
            .colliders
            .iter()
            .filter_map(|id| self.world.collider_records.get(*id))
            .map(|record| record.handle)
            .collect()
    }

    fn moves(&self) -> bool {
        self.record().kind != BodyKind::Static
    }
}

impl PhysicsBody for RapierBody<'_> {
    fn id(&self) -> BodyId {
        self.id
    }

    fn kind(&self) -> BodyKind {
        self.record().kind
    }

    fn position(&self) -> Vec2 {
        na_to_vec2(self.rb().translation())
    }

    fn set_position(&mut self, position: Vec2) {
        self.rb_mut().set_translation(vec2_to_na(position), true);
        self.world.sync_collider_positions();
    }

    fn rotation(&self) -> f32 {
        self.rb().rotation().angle()
    }

    fn linear_velocity(&self) -> Vec2 {
        na_to_vec2(self.rb().linvel())
    }

    fn set_linear_velocity(&mut self, velocity: Vec2) {
        self.rb_mut().set_linvel(vec2_to_na(velocity), true);
    }

    fn linear_damping(&self) -> f32 {
        self.rb().linear_damping()
    }

    fn set_linear_damping(&mut self, damping: f32) {
        self.rb_mut().set_linear_damping(damping);
    }

    fn is_enabled(&self) -> bool {
        self.rb().is_enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.rb_mut().set_enabled(enabled);
        self.world.mark_query_dirty();
    }

    fn is_bullet(&self) -> bool {
        self.rb().is_ccd_enabled()
    }

    fn set_bullet(&mut self, bullet: bool) {
        self.rb_mut().enable_ccd(bullet);
    }

    fn user_data(&self) -> Option<NodeId> {
        self.record().user_data
    }

    fn set_user_data(&mut self, node: Option<NodeId>) {
        self.record_mut().user_data = node;
    }

    fn set_sensor(&mut self, sensor: bool) {
        for handle in self.collider_handles() {
            if let Some(collider) = self.world.colliders.get_mut(handle) {
                collider.set_sensor(sensor);
            }
        }
    }

    fn set_layers(&mut self, layers: u32) {
        for id in self.colliders() {
            if let Ok(mut collider) = self.world.collider(id) {
                collider.set_layers(layers);
            }
        }
    }

    fn set_collides_with(&mut self, collides_with: u32) {
        for id in self.colliders() {
            if let Ok(mut collider) = self.world.collider(id) {
                collider.set_collides_with(collides_with);
            }
        }
    }

    fn apply_force(&mut self, force: Vec2) {
        if self.moves() {
            self.rb_mut().add_force(vec2_to_na(force), true);
        }
    }

    fn apply_impulse(&mut self, impulse: Vec2) {
        if self.moves() {
            self.rb_mut().apply_impulse(vec2_to_na(impulse), true);
        }
    }

    fn colliders(&self) -> Vec<ColliderId> {
        self.record().colliders.clone()
    }

    fn set_collision_listener(&mut self, listener: Option<CollisionListener>) {
        self.record_mut().listener = listener;
    }

    fn add_collider(&mut self, shape: ColliderShape) -> Result<ColliderId> {
        self.world.attach_collider(self.id, shape)
    }

    fn dispose(self) {
        self.world.remove_body(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhysicsError;

    #[test]
    fn setters_round_trip() {
        let mut world = RapierWorld::default();
        let id = world.create_rigid_body();
        let mut body = world.body(id).unwrap();

        body.set_position(Vec2::new(3.0, -2.0));
        body.set_linear_velocity(Vec2::new(1.0, 2.0));
        body.set_linear_damping(0.5);
        body.set_bullet(true);
        body.set_user_data(Some(NodeId(9)));

        assert_eq!(body.position(), Vec2::new(3.0, -2.0));
        assert_eq!(body.linear_velocity(), Vec2::new(1.0, 2.0));
        assert_eq!(body.linear_damping(), 0.5);
        assert!(body.is_bullet());
        assert_eq!(body.user_data(), Some(NodeId(9)));
        assert!(body.is_enabled());
        body.set_enabled(false);
        assert!(!body.is_enabled());
    }

    #[test]
    fn impulse_moves_dynamic_body() {
        let mut world = RapierWorld::default();
        let id = world.create_rigid_body();
        {
            let mut body = world.body(id).unwrap();
            body.add_circle_collider(Vec2::ZERO, 0.5).unwrap();
            body.apply_impulse(Vec2::new(5.0, 0.0));
        }
        world.step(1.0 / 60.0).unwrap();
        let body = world.body(id).unwrap();
        assert!(body.linear_velocity().x > 0.0);
        assert!(body.position().x > 0.0);
    }

    #[test]
    fn static_body_ignores_impulse() {
        let mut world = RapierWorld::default();
        let id = world.create_static_body();
        let mut body = world.body(id).unwrap();
        body.add_box_collider(Vec2::ZERO, Vec2::ONE).unwrap();
        body.apply_impulse(Vec2::new(5.0, 0.0));
        assert_eq!(body.linear_velocity(), Vec2::ZERO);
    }

    #[test]
    fn body_wide_filter_settings_reach_every_collider() {
        let mut world = RapierWorld::default();
        let id = world.create_rigid_body();
        let colliders = {
            let mut body = world.body(id).unwrap();
            body.add_circle_collider(Vec2::ZERO, 0.5).unwrap();
            body.add_box_collider(Vec2::new(1.0, 0.0), Vec2::ONE).unwrap();
            body.set_layers(0b100);
            body.set_collides_with(0b010);
            body.set_sensor(true);
            body.colliders()
        };
        assert_eq!(colliders.len(), 2);
        for cid in colliders {
            let collider = world.collider(cid).unwrap();
            assert_eq!(collider.layers(), 0b100);
            assert_eq!(collider.collides_with(), 0b010);
            assert!(collider.is_sensor());
            assert_eq!(collider.body(), id);
        }
    }

    #[test]
    fn chain_collider_is_unsupported() {
        let mut world = RapierWorld::default();
        let id = world.create_rigid_body();
        let mut body = world.body(id).unwrap();
        let points = [Vec2::ZERO, Vec2::X, Vec2::ONE];
        assert_eq!(
            body.add_chain_collider(Vec2::ZERO, &points, true),
            Err(PhysicsError::Unsupported("chain collider"))
        );
        assert!(body.colliders().is_empty());
    }

    #[test]
    fn degenerate_polygon_is_rejected() {
        let mut world = RapierWorld::default();
        let id = world.create_rigid_body();
        let mut body = world.body(id).unwrap();
        let collinear = [Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)];
        assert!(matches!(
            body.add_polygon_collider(Vec2::ZERO, &collinear),
            Err(PhysicsError::InvalidShape(_))
        ));
        assert!(body.colliders().is_empty());
        drop(body);
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn dispose_through_view() {
        let mut world = RapierWorld::default();
        let id = world.create_rigid_body();
        let collider = world
            .body(id)
            .unwrap()
            .add_circle_collider(Vec2::ZERO, 1.0)
            .unwrap();
        world.body(id).unwrap().dispose();
        assert!(!world.contains_body(id));
        assert!(!world.contains_collider(collider));
        assert!(matches!(
            world.collider(collider),
            Err(PhysicsError::ColliderDisposed(_))
        ));
    }
}
