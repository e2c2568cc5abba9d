use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::layers;
use crate::core::units::{UnitScale, DEFAULT_PIXELS_PER_METER};

/// Green, the colour collider wireframes are drawn with.
pub const DEBUG_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];

/// Configuration for a physics world. Fixed once the world is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Gravity in simulation units per second squared. Default: zero.
    pub gravity: Vec2,
    /// Presentation pixels per simulation meter (debug draw only).
    pub pixels_per_meter: f32,
    /// "Is" layers given to new colliders.
    pub default_layers: u32,
    /// "Collides with" layers given to new colliders.
    pub default_collides_with: u32,
    /// RGBA colour of debug wireframes.
    pub debug_color: [f32; 4],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::ZERO,
            pixels_per_meter: DEFAULT_PIXELS_PER_METER,
            default_layers: layers::DEFAULT,
            default_collides_with: layers::ALL,
            debug_color: DEBUG_COLOR,
        }
    }
}

impl WorldConfig {
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_pixels_per_meter(mut self, pixels_per_meter: f32) -> Self {
        self.pixels_per_meter = pixels_per_meter;
        self
    }

    pub fn with_default_masks(mut self, layers: u32, collides_with: u32) -> Self {
        self.default_layers = layers;
        self.default_collides_with = collides_with;
        self
    }

    pub fn unit_scale(&self) -> UnitScale {
        UnitScale::new(self.pixels_per_meter)
    }

    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
