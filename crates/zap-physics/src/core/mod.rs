pub mod units;
pub mod shape;
#[cfg(feature = "rapier")]
pub mod physics;
#[cfg(feature = "rapier")]
pub mod body;
#[cfg(feature = "rapier")]
pub mod collider;
