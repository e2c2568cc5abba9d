pub mod api;
pub mod core;
pub mod error;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::{WorldConfig, DEBUG_COLOR};
pub use api::event::{Collision, CollisionListener};
pub use api::traits::{PhysicsBody, PhysicsCollider, PhysicsWorld, SpatialQuery};
pub use api::types::{layers, BodyId, BodyKind, ColliderId, NodeId, Region};
pub use core::shape::{ColliderShape, CIRCLE_SEGMENTS};
pub use core::units::{meters_to_pixels, pixels_to_meters, UnitScale, DEFAULT_PIXELS_PER_METER};
pub use error::{PhysicsError, Result};
pub use renderer::debug_buffer::{DebugDrawBuffer, DrawBatch};
pub use renderer::traits::{DebugVertex, DrawContext, ImageId, Topology};
pub use systems::debug::{collider_wireframe, draw_collider, BodyPose};

#[cfg(feature = "rapier")]
pub use core::physics::RapierWorld;
#[cfg(feature = "rapier")]
pub use core::body::RapierBody;
#[cfg(feature = "rapier")]
pub use core::collider::RapierCollider;
