use rapier2d::prelude::{Collider, ColliderHandle, Group, InteractionGroups};

use crate::api::traits::{PhysicsCollider, PhysicsWorld};
use crate::api::types::{BodyId, ColliderId, NodeId};
use crate::core::physics::{ColliderRecord, RapierWorld};
use crate::core::shape::ColliderShape;
use crate::renderer::traits::DrawContext;

/// Borrowed view of one collider in a [`RapierWorld`].
pub struct RapierCollider<'w> {
    world: &'w mut RapierWorld,
    id: ColliderId,
    handle: ColliderHandle,
}

impl<'w> RapierCollider<'w> {
    pub(crate) fn new(world: &'w mut RapierWorld, id: ColliderId, handle: ColliderHandle) -> Self {
        Self { world, id, handle }
    }

    fn co(&self) -> &Collider {
        &self.world.colliders[self.handle]
    }

    fn record(&self) -> &ColliderRecord {
        &self.world.collider_records[self.id]
    }

    fn update_groups(&mut self, update: impl FnOnce(&mut InteractionGroups)) {
        let collider = &mut self.world.colliders[self.handle];
        let mut groups = collider.collision_groups();
        update(&mut groups);
        collider.set_collision_groups(groups);
        self.world.mark_query_dirty();
    }
}

impl PhysicsCollider for RapierCollider<'_> {
    fn id(&self) -> ColliderId {
        self.id
    }

    fn body(&self) -> BodyId {
        self.record().body
    }

    fn shape(&self) -> &ColliderShape {
        &self.record().shape
    }

    fn layers(&self) -> u32 {
        self.co().collision_groups().memberships.bits()
    }

    fn set_layers(&mut self, layers: u32) {
        self.update_groups(|groups| groups.memberships = Group::from_bits_truncate(layers));
    }

    fn collides_with(&self) -> u32 {
        self.co().collision_groups().filter.bits()
    }

    fn set_collides_with(&mut self, collides_with: u32) {
        self.update_groups(|groups| groups.filter = Group::from_bits_truncate(collides_with));
    }

    fn node(&self) -> Option<NodeId> {
        self.record().node
    }

    fn set_node(&mut self, node: Option<NodeId>) {
        self.world.collider_records[self.id].node = node;
    }

    fn is_sensor(&self) -> bool {
        self.co().is_sensor()
    }

    fn set_sensor(&mut self, sensor: bool) {
        self.world.colliders[self.handle].set_sensor(sensor);
    }

    fn draw_debug(&self, ctx: &mut dyn DrawContext) {
        self.world.draw_collider_debug(ctx, self.id);
    }

    fn dispose(self) {
        self.world.remove_collider(self.id);
    }
}
