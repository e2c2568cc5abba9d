use std::cell::{Cell, RefCell};
use std::sync::Mutex;

use glam::{Affine2, Vec2};
use rapier2d::na::{Point2, Vector2};
use rapier2d::parry::bounding_volume::Aabb;
use rapier2d::prelude::{
    ActiveEvents, CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, CollisionEvent,
    ContactPair, DefaultBroadPhase, EventHandler, Group, ImpulseJointSet, IntegrationParameters,
    InteractionGroups, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    QueryPipeline, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType,
};
use slotmap::{Key, KeyData, SlotMap};

use crate::api::config::WorldConfig;
use crate::api::event::{Collision, CollisionListener};
use crate::api::traits::{PhysicsWorld, SpatialQuery};
use crate::api::types::{layers, BodyId, BodyKind, ColliderId, NodeId, Region};
use crate::core::body::RapierBody;
use crate::core::collider::RapierCollider;
use crate::core::shape::ColliderShape;
use crate::error::{PhysicsError, Result};
use crate::renderer::traits::DrawContext;
use crate::systems::debug::{draw_collider, BodyPose};

// ---------------------------------------------------------------------------
// Conversion helpers: glam ↔ nalgebra, ids ↔ user_data
// ---------------------------------------------------------------------------

pub(crate) fn vec2_to_na(v: Vec2) -> Vector2<f32> {
    Vector2::new(v.x, v.y)
}

pub(crate) fn na_to_vec2(v: &Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn vec2_to_point(v: Vec2) -> Point2<f32> {
    Point2::new(v.x, v.y)
}

fn key_to_user_data<K: Key>(key: K) -> u128 {
    key.data().as_ffi() as u128
}

fn user_data_to_key<K: Key + From<KeyData>>(user_data: u128) -> K {
    K::from(KeyData::from_ffi(user_data as u64))
}

pub(crate) fn interaction_groups(layers: u32, collides_with: u32) -> InteractionGroups {
    InteractionGroups::new(
        Group::from_bits_truncate(layers),
        Group::from_bits_truncate(collides_with),
    )
}

fn rapier_body_type(kind: BodyKind) -> RigidBodyType {
    match kind {
        BodyKind::Static => RigidBodyType::Fixed,
        BodyKind::Dynamic => RigidBodyType::Dynamic,
        BodyKind::Kinematic => RigidBodyType::KinematicVelocityBased,
    }
}

fn collider_builder(shape: &ColliderShape) -> Result<ColliderBuilder> {
    let builder = match shape {
        ColliderShape::Box { center, size } => {
            ColliderBuilder::cuboid(size.x * 0.5, size.y * 0.5).translation(vec2_to_na(*center))
        }
        ColliderShape::Circle { center, radius } => {
            ColliderBuilder::ball(*radius).translation(vec2_to_na(*center))
        }
        ColliderShape::Polygon { vertices } => {
            let points: Vec<Point2<f32>> = vertices.iter().map(|v| vec2_to_point(*v)).collect();
            ColliderBuilder::convex_hull(&points).ok_or_else(|| {
                PhysicsError::InvalidShape(format!(
                    "polygon of {} points has no area",
                    vertices.len()
                ))
            })?
        }
        ColliderShape::Edge { start, end } => {
            ColliderBuilder::segment(vec2_to_point(*start), vec2_to_point(*end))
        }
    };
    Ok(builder)
}

// ---------------------------------------------------------------------------
// Side tables: engine-level state the backend handles point back into
// ---------------------------------------------------------------------------

pub(crate) struct BodyRecord {
    pub(crate) handle: RigidBodyHandle,
    pub(crate) kind: BodyKind,
    pub(crate) user_data: Option<NodeId>,
    pub(crate) colliders: Vec<ColliderId>,
    pub(crate) listener: Option<CollisionListener>,
    /// Set once, when the first collider is attached.
    pub(crate) intercepting: bool,
}

pub(crate) struct ColliderRecord {
    pub(crate) handle: ColliderHandle,
    pub(crate) body: BodyId,
    pub(crate) shape: ColliderShape,
    pub(crate) node: Option<NodeId>,
}

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        let mut collisions = self
            .collisions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *collisions)
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        // Only contact-begin is translated into engine events.
        if event.started() {
            self.collisions
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(event);
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

// ---------------------------------------------------------------------------
// RapierWorld
// ---------------------------------------------------------------------------

/// [`PhysicsWorld`] backed by Rapier2D.
///
/// Bodies and colliders live in generational arenas; the matching Rapier
/// objects carry the arena key in their `user_data`, which is how backend
/// callbacks find their way back to engine-level state.
pub struct RapierWorld {
    config: WorldConfig,
    gravity: Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: RefCell<QueryPipeline>,
    /// Colliders moved or changed since the query pipeline was last rebuilt.
    query_dirty: Cell<bool>,
    event_collector: DirectEventCollector,
    pub(crate) body_records: SlotMap<BodyId, BodyRecord>,
    pub(crate) collider_records: SlotMap<ColliderId, ColliderRecord>,
    disposed: bool,
    poisoned: bool,
}

impl RapierWorld {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            gravity: vec2_to_na(config.gravity),
            config,
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: RefCell::new(QueryPipeline::new()),
            query_dirty: Cell::new(false),
            event_collector: DirectEventCollector::new(),
            body_records: SlotMap::with_key(),
            collider_records: SlotMap::with_key(),
            disposed: false,
            poisoned: false,
        }
    }

    /// World with default config and the given gravity (simulation units).
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self::new(WorldConfig::default().with_gravity(gravity))
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.body_records.len()
    }

    /// Number of live colliders.
    pub fn collider_count(&self) -> usize {
        self.collider_records.len()
    }

    pub(crate) fn mark_query_dirty(&self) {
        self.query_dirty.set(true);
    }

    /// Push body pose changes made outside a step onto attached colliders.
    pub(crate) fn sync_collider_positions(&mut self) {
        self.bodies
            .propagate_modified_body_positions_to_colliders(&mut self.colliders);
        self.mark_query_dirty();
    }

    pub(crate) fn attach_collider(&mut self, body: BodyId, shape: ColliderShape) -> Result<ColliderId> {
        let body_handle = self
            .body_records
            .get(body)
            .ok_or(PhysicsError::BodyDisposed(body))?
            .handle;

        let collider = collider_builder(&shape)?
            .collision_groups(interaction_groups(
                self.config.default_layers,
                self.config.default_collides_with,
            ))
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let handle = self
            .colliders
            .insert_with_parent(collider, body_handle, &mut self.bodies);

        let name = shape.name();
        let id = self.collider_records.insert(ColliderRecord {
            handle,
            body,
            shape,
            node: None,
        });
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.user_data = key_to_user_data(id);
        }

        if let Some(record) = self.body_records.get_mut(body) {
            record.colliders.push(id);
            if !record.intercepting {
                record.intercepting = true;
                log::debug!("body {:?}: collision interception registered", body);
            }
        }
        self.mark_query_dirty();
        log::debug!("attached {} collider {:?} to body {:?}", name, id, body);
        Ok(id)
    }

    /// Collider key carried by a backend handle, if it still names a live collider.
    fn live_collider(&self, handle: ColliderHandle) -> Option<ColliderId> {
        let collider = self.colliders.get(handle)?;
        let id: ColliderId = user_data_to_key(collider.user_data);
        self.collider_records
            .get(id)
            .filter(|record| record.handle == handle)
            .map(|_| id)
    }

    fn node_of(&self, record: &ColliderRecord) -> Option<NodeId> {
        record
            .node
            .or_else(|| self.body_records.get(record.body).and_then(|b| b.user_data))
    }

    fn describe_collision(&self, collider: ColliderId, other: ColliderId) -> Option<Collision> {
        let own = self.collider_records.get(collider)?;
        let theirs = self.collider_records.get(other)?;
        Some(Collision {
            body: own.body,
            other_body: theirs.body,
            collider,
            other_collider: other,
            node: self.node_of(own),
            other_node: self.node_of(theirs),
        })
    }

    /// Hand the contact to the listener of `collider`'s body, seen from that body.
    fn notify(&mut self, collider: ColliderId, other: ColliderId) {
        let Some(collision) = self.describe_collision(collider, other) else {
            return;
        };
        let Some(record) = self.body_records.get_mut(collision.body) else {
            return;
        };
        if !record.intercepting {
            return;
        }
        let Some(mut listener) = record.listener.take() else {
            return;
        };

        listener(&collision, &*self);

        // The listener may have replaced itself; only restore when the slot is empty.
        if let Some(record) = self.body_records.get_mut(collision.body) {
            if record.listener.is_none() {
                record.listener = Some(listener);
            }
        }
    }

    fn dispatch_collisions(&mut self) {
        for event in self.event_collector.drain_collisions() {
            let CollisionEvent::Started(h1, h2, _) = event else {
                continue;
            };
            let (Some(a), Some(b)) = (self.live_collider(h1), self.live_collider(h2)) else {
                continue;
            };
            self.notify(a, b);
            self.notify(b, a);
        }
    }

    fn find_diverged_body(&self) -> Option<BodyId> {
        self.body_records.iter().find_map(|(id, record)| {
            let rb = self.bodies.get(record.handle)?;
            let finite = na_to_vec2(rb.translation()).is_finite() && na_to_vec2(rb.linvel()).is_finite();
            (!finite).then_some(id)
        })
    }

    fn refresh_query_pipeline(&self) {
        if self.query_dirty.get() {
            self.query_pipeline.borrow_mut().update(&self.colliders);
            self.query_dirty.set(false);
        }
    }

    /// The collider behind `handle` if it is live, enabled and on `layer_mask`.
    fn queryable_collider(&self, handle: ColliderHandle, layer_mask: u32) -> Option<ColliderId> {
        let collider = self.colliders.get(handle)?;
        let body_enabled = collider
            .parent()
            .and_then(|parent| self.bodies.get(parent))
            .map_or(true, |rb| rb.is_enabled());
        if !body_enabled
            || !collider.is_enabled()
            || !layers::intersects(collider.collision_groups().memberships.bits(), layer_mask)
        {
            return None;
        }
        self.live_collider(handle)
    }

    pub(crate) fn draw_collider_debug(&self, ctx: &mut dyn DrawContext, id: ColliderId) {
        let Some(record) = self.collider_records.get(id) else {
            return;
        };
        let Some(pose) = self
            .body_records
            .get(record.body)
            .and_then(|body| self.bodies.get(body.handle))
            .map(|rb| BodyPose::new(na_to_vec2(rb.translation()), rb.rotation().angle()))
        else {
            return;
        };
        draw_collider(
            ctx,
            &record.shape,
            pose,
            self.config.unit_scale(),
            self.config.debug_color,
        );
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl SpatialQuery for RapierWorld {
    fn visit_region(&self, region: &Region, layer_mask: u32, visit: &mut dyn FnMut(ColliderId) -> bool) {
        if self.disposed {
            return;
        }
        self.refresh_query_pipeline();

        let aabb = Aabb::new(vec2_to_point(region.min), vec2_to_point(region.max));
        let mut hits = 0usize;
        self.query_pipeline
            .borrow()
            .colliders_with_aabb_intersecting_aabb(&aabb, |handle| {
                match self.queryable_collider(*handle, layer_mask) {
                    Some(id) => {
                        hits += 1;
                        visit(id)
                    }
                    None => true,
                }
            });

        log::trace!("query {:?} mask={:#010x}: {} hits", region, layer_mask, hits);
    }
}

impl PhysicsWorld for RapierWorld {
    type Body<'w> = RapierBody<'w>;
    type Collider<'w> = RapierCollider<'w>;

    fn create_body(&mut self, kind: BodyKind) -> BodyId {
        assert!(!self.disposed, "create_body called on a disposed physics world");

        let rb = RigidBodyBuilder::new(rapier_body_type(kind)).build();
        let handle = self.bodies.insert(rb);
        let id = self.body_records.insert(BodyRecord {
            handle,
            kind,
            user_data: None,
            colliders: Vec::new(),
            listener: None,
            intercepting: false,
        });
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.user_data = key_to_user_data(id);
        }
        log::debug!("created {:?} body {:?}", kind, id);
        id
    }

    fn body(&mut self, id: BodyId) -> Result<RapierBody<'_>> {
        if self.disposed {
            return Err(PhysicsError::WorldDisposed);
        }
        let handle = self
            .body_records
            .get(id)
            .ok_or(PhysicsError::BodyDisposed(id))?
            .handle;
        Ok(RapierBody::new(self, id, handle))
    }

    fn collider(&mut self, id: ColliderId) -> Result<RapierCollider<'_>> {
        if self.disposed {
            return Err(PhysicsError::WorldDisposed);
        }
        let handle = self
            .collider_records
            .get(id)
            .ok_or(PhysicsError::ColliderDisposed(id))?
            .handle;
        Ok(RapierCollider::new(self, id, handle))
    }

    fn contains_body(&self, id: BodyId) -> bool {
        self.body_records.contains_key(id)
    }

    fn contains_collider(&self, id: ColliderId) -> bool {
        self.collider_records.contains_key(id)
    }

    fn remove_body(&mut self, id: BodyId) {
        let Some(record) = self.body_records.remove(id) else {
            return;
        };
        for collider in &record.colliders {
            self.collider_records.remove(*collider);
        }
        // Rapier drops the attached colliders together with the body.
        self.bodies.remove(
            record.handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.mark_query_dirty();
        log::debug!("removed body {:?} ({} colliders)", id, record.colliders.len());
    }

    fn remove_collider(&mut self, id: ColliderId) {
        let Some(record) = self.collider_records.remove(id) else {
            return;
        };
        if let Some(body) = self.body_records.get_mut(record.body) {
            body.colliders.retain(|c| *c != id);
        }
        self.colliders.remove(
            record.handle,
            &mut self.island_manager,
            &mut self.bodies,
            true,
        );
        self.mark_query_dirty();
        log::debug!("removed {} collider {:?}", record.shape.name(), id);
    }

    fn step(&mut self, dt: f32) -> Result<()> {
        if self.disposed {
            return Err(PhysicsError::WorldDisposed);
        }
        if self.poisoned {
            return Err(PhysicsError::WorldPoisoned);
        }
        if !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidTimestep(dt));
        }
        if dt == 0.0 {
            return Ok(());
        }

        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(self.query_pipeline.get_mut()),
            &(),
            &self.event_collector,
        );
        self.query_dirty.set(false);

        if let Some(body) = self.find_diverged_body() {
            self.poisoned = true;
            self.event_collector.drain_collisions();
            log::error!("physics step diverged at body {:?}; world poisoned", body);
            return Err(PhysicsError::StepDiverged(body));
        }

        self.dispatch_collisions();
        Ok(())
    }

    fn draw_debug(&self, ctx: &mut dyn DrawContext, layer_mask: u32) {
        ctx.set_image(None);
        ctx.set_transform(Affine2::IDENTITY);
        if self.disposed {
            return;
        }
        for (_, body) in &self.body_records {
            for &id in &body.colliders {
                let Some(record) = self.collider_records.get(id) else {
                    continue;
                };
                let on_mask = self
                    .colliders
                    .get(record.handle)
                    .map(|c| layers::intersects(c.collision_groups().memberships.bits(), layer_mask))
                    .unwrap_or(false);
                if on_mask {
                    self.draw_collider_debug(ctx, id);
                }
            }
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let ids: Vec<BodyId> = self.body_records.keys().collect();
        for id in ids {
            self.remove_body(id);
        }
        self.event_collector.drain_collisions();
        self.disposed = true;
        log::debug!("physics world disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
