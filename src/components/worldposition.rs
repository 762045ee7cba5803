use bevy_ecs::prelude::Component;
use nalgebra::Vector3;

use crate::components::groundpoint::GroundPoint;

/// World-space position of an entity's pivot.
///
/// This is the render-facing transform. For physics-backed entities it is a
/// copy of the body translation made after the locomotion integrator runs.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct WorldPosition {
    pub pos: Vector3<f32>,
}

impl WorldPosition {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vector3::new(x, y, z),
        }
    }

    /// Horizontal projection onto the ground plane.
    pub fn ground(&self) -> GroundPoint {
        GroundPoint::new(self.pos.x, self.pos.z)
    }
}

impl Default for WorldPosition {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}
