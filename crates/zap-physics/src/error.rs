//! Error type shared by every physics backend.

use thiserror::Error;

use crate::api::types::{BodyId, ColliderId};

/// Errors raised by the physics layer.
///
/// Most inputs come from trusted engine code, so the taxonomy is small:
/// stale handles, unsupported or malformed shapes, and a world that can no
/// longer be stepped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("body {0:?} has been disposed")]
    BodyDisposed(BodyId),

    #[error("collider {0:?} has been disposed")]
    ColliderDisposed(ColliderId),

    #[error("the physics world has been disposed")]
    WorldDisposed,

    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("invalid timestep: {0}")]
    InvalidTimestep(f32),

    #[error("simulation diverged at body {0:?}")]
    StepDiverged(BodyId),

    #[error("the physics world diverged earlier and can no longer be stepped")]
    WorldPoisoned,
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
