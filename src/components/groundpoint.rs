//! Horizontal points on the ground plane.

use serde::{Deserialize, Serialize};

/// A point on the ground plane (`x`, `z`), as produced by a ground pick.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct GroundPoint {
    pub x: f32,
    pub z: f32,
}

impl GroundPoint {
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Yaw facing `target` from `self`, `atan2(dz, dx)`.
    ///
    /// Returns `None` when both points coincide, so callers can keep the
    /// previous heading instead of snapping to zero.
    pub fn yaw_to(&self, target: GroundPoint) -> Option<f32> {
        let dx = target.x - self.x;
        let dz = target.z - self.z;
        if dx == 0.0 && dz == 0.0 {
            None
        } else {
            Some(dz.atan2(dx))
        }
    }

    pub fn distance_to(&self, other: GroundPoint) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }
}
