use crate::api::traits::SpatialQuery;
use crate::api::types::{BodyId, ColliderId, NodeId};

/// A contact that just began, seen from one body.
///
/// `body`/`collider`/`node` are the side that owns the listener,
/// `other_*` the opposing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub body: BodyId,
    pub other_body: BodyId,
    pub collider: ColliderId,
    pub other_collider: ColliderId,
    /// Node of the self collider, or of its body when the collider has none.
    pub node: Option<NodeId>,
    /// Node of the other collider, or of its body when the collider has none.
    pub other_node: Option<NodeId>,
}

impl Collision {
    /// The same contact seen from the other body.
    pub fn flipped(&self) -> Self {
        Self {
            body: self.other_body,
            other_body: self.body,
            collider: self.other_collider,
            other_collider: self.collider,
            node: self.other_node,
            other_node: self.node,
        }
    }
}

/// Called synchronously from inside `step` for every contact-begin involving
/// one of the body's colliders. The listener may query the world while the
/// step is running.
pub type CollisionListener = Box<dyn FnMut(&Collision, &dyn SpatialQuery) + Send>;
