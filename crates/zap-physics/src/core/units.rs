//! Simulation ↔ presentation unit conversion.
//!
//! The backend works in meters. Rendering works in pixels. Geometry is only
//! converted when it leaves the physics layer for drawing.

use glam::Vec2;

pub const DEFAULT_PIXELS_PER_METER: f32 = 100.0;

/// Linear scale between simulation meters and presentation pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitScale {
    pub pixels_per_meter: f32,
}

impl UnitScale {
    pub fn new(pixels_per_meter: f32) -> Self {
        Self { pixels_per_meter }
    }

    #[inline]
    pub fn to_presentation(&self, meters: f32) -> f32 {
        meters * self.pixels_per_meter
    }

    #[inline]
    pub fn to_simulation(&self, pixels: f32) -> f32 {
        pixels / self.pixels_per_meter
    }

    #[inline]
    pub fn vec_to_presentation(&self, v: Vec2) -> Vec2 {
        v * self.pixels_per_meter
    }

    #[inline]
    pub fn vec_to_simulation(&self, v: Vec2) -> Vec2 {
        v / self.pixels_per_meter
    }
}

impl Default for UnitScale {
    fn default() -> Self {
        Self::new(DEFAULT_PIXELS_PER_METER)
    }
}

pub fn meters_to_pixels(meters: f32) -> f32 {
    UnitScale::default().to_presentation(meters)
}

pub fn pixels_to_meters(pixels: f32) -> f32 {
    UnitScale::default().to_simulation(pixels)
}
